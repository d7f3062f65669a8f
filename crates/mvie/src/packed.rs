//! Packed lower triangle of a symmetric matrix.
//!
//! Layout: column by column, outer index column `j`, inner index row `i >= j`.
//! This is the order in which the solver reports the primal value of a matrix
//! variable, so both the program builder and the extractor go through here.

use nalgebra::DMatrix;

/// Index map for the packed lower triangle of an `order × order` symmetric matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymPacked {
    order: usize,
}

impl SymPacked {
    #[inline]
    pub fn new(order: usize) -> Self {
        Self { order }
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of stored entries, `order (order + 1) / 2`.
    #[inline]
    pub fn len(&self) -> usize {
        self.order * (self.order + 1) / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order == 0
    }

    /// Position of `(row, col)` in the packed vector. Upper-triangle pairs are
    /// reflected, so `index_of(i, j) == index_of(j, i)`.
    #[inline]
    pub fn index_of(&self, row: usize, col: usize) -> usize {
        let (i, j) = lower(row, col);
        debug_assert!(i < self.order, "({row}, {col}) outside order {}", self.order);
        self.col_start(j) + (i - j)
    }

    /// Inverse of `index_of`: the lower-triangle `(row, col)` stored at `idx`.
    pub fn entry(&self, idx: usize) -> (usize, usize) {
        debug_assert!(idx < self.len());
        let mut j = 0;
        while j + 1 < self.order && self.col_start(j + 1) <= idx {
            j += 1;
        }
        (j + idx - self.col_start(j), j)
    }

    /// Lower-triangle pairs `(row, col)` in packed order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.order).flat_map(move |j| (j..self.order).map(move |i| (i, j)))
    }

    /// Write the full symmetric matrix held in `packed` into `out`.
    pub fn unpack_into(&self, packed: &[f64], out: &mut DMatrix<f64>) {
        debug_assert_eq!(packed.len(), self.len());
        debug_assert_eq!(out.shape(), (self.order, self.order));
        for (&v, (i, j)) in packed.iter().zip(self.iter()) {
            out[(i, j)] = v;
            out[(j, i)] = v;
        }
    }

    /// Full symmetric matrix from `packed`.
    pub fn unpack(&self, packed: &[f64]) -> DMatrix<f64> {
        let mut out = DMatrix::zeros(self.order, self.order);
        self.unpack_into(packed, &mut out);
        out
    }

    /// Leading `k × k` block only. Entries outside it are skipped.
    pub fn unpack_leading_into(&self, packed: &[f64], k: usize, out: &mut DMatrix<f64>) {
        debug_assert!(k <= self.order);
        debug_assert_eq!(out.shape(), (k, k));
        for (&v, (i, j)) in packed.iter().zip(self.iter()) {
            if i < k && j < k {
                out[(i, j)] = v;
                out[(j, i)] = v;
            }
        }
    }

    /// Packed lower triangle of `m` (the upper triangle is ignored).
    pub fn pack(&self, m: &DMatrix<f64>) -> Vec<f64> {
        debug_assert_eq!(m.shape(), (self.order, self.order));
        self.iter().map(|(i, j)| m[(i, j)]).collect()
    }

    #[inline]
    fn col_start(&self, j: usize) -> usize {
        j * (2 * self.order - j + 1) / 2
    }
}

/// Reflect `(row, col)` into the lower triangle.
#[inline]
pub fn lower(row: usize, col: usize) -> (usize, usize) {
    if row >= col {
        (row, col)
    } else {
        (col, row)
    }
}
