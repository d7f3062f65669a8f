//! Scalar variable groups and the matrix variable handle.

use std::ops::Range;

use super::dims::ProblemDims;

/// Handle of the symmetric matrix variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarVar {
    pub index: usize,
    pub order: usize,
}

/// Contiguous, gap-free index ranges in the order `t, d, s, s', z, f, g`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarLayout {
    n: usize,
    t: usize,
    d: Range<usize>,
    s: Range<usize>,
    sprime: Range<usize>,
    z: Range<usize>,
    f: Range<usize>,
    g: Range<usize>,
    bar: BarVar,
}

struct Alloc(usize);

impl Alloc {
    fn take(&mut self, len: usize) -> Range<usize> {
        let r = self.0..self.0 + len;
        self.0 = r.end;
        r
    }
}

impl VarLayout {
    pub fn new(dims: &ProblemDims) -> Self {
        let mut next = Alloc(0);
        let t = next.take(1).start;
        Self {
            n: dims.n,
            t,
            d: next.take(dims.n),
            s: next.take(dims.internal()),
            sprime: next.take(dims.internal()),
            z: next.take(dims.leaves()),
            f: next.take(dims.m * dims.n),
            g: next.take(dims.m),
            bar: BarVar {
                index: 0,
                order: dims.block_order(),
            },
        }
    }

    #[inline]
    pub fn num_vars(&self) -> usize {
        self.g.end
    }

    #[inline]
    pub fn bar(&self) -> BarVar {
        self.bar
    }

    #[inline]
    pub fn t(&self) -> usize {
        self.t
    }

    #[inline]
    pub fn d(&self, k: usize) -> usize {
        debug_assert!(k < self.d.len());
        self.d.start + k
    }

    #[inline]
    pub fn s(&self, j: usize) -> usize {
        debug_assert!(j < self.s.len());
        self.s.start + j
    }

    #[inline]
    pub fn sprime(&self, j: usize) -> usize {
        debug_assert!(j < self.sprime.len());
        self.sprime.start + j
    }

    #[inline]
    pub fn z(&self, j: usize) -> usize {
        debug_assert!(j < self.z.len());
        self.z.start + j
    }

    /// `f_{i,j} = (C a_i)_j`, row-major in `(i, j)`.
    #[inline]
    pub fn f(&self, i: usize, j: usize) -> usize {
        debug_assert!(j < self.n && i * self.n + j < self.f.len());
        self.f.start + i * self.n + j
    }

    #[inline]
    pub fn g(&self, i: usize) -> usize {
        debug_assert!(i < self.g.len());
        self.g.start + i
    }

    /// Groups as `(name, range)` in layout order.
    pub fn groups(&self) -> [(&'static str, Range<usize>); 7] {
        [
            ("t", self.t..self.t + 1),
            ("d", self.d.clone()),
            ("s", self.s.clone()),
            ("s'", self.sprime.clone()),
            ("z", self.z.clone()),
            ("f", self.f.clone()),
            ("g", self.g.clone()),
        ]
    }
}
