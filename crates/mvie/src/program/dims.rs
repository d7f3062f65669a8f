//! Group sizes and expected emission counts.

use super::FormulationCfg;
use crate::error::MvieError;

/// Sizes derived from `(n, m)`; every builder checks its output against these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProblemDims {
    /// Ambient dimension.
    pub n: usize,
    /// Number of half-spaces.
    pub m: usize,
    /// Depth of the geometric-mean tree, `ceil(log2 n)`.
    pub depth: u32,
    /// Triangular coupling rows are emitted.
    pub coupling: bool,
}

impl ProblemDims {
    pub fn new(n: usize, m: usize, cfg: FormulationCfg) -> Result<Self, MvieError> {
        if n == 0 {
            return Err(MvieError::invalid("dimension must be at least 1"));
        }
        if m < n + 1 {
            return Err(MvieError::invalid(format!(
                "{m} half-spaces cannot bound a polytope in R^{n} (need at least {})",
                n + 1
            )));
        }
        Ok(Self {
            n,
            m,
            depth: n.next_power_of_two().trailing_zeros(),
            coupling: cfg.triangular_coupling,
        })
    }

    /// Chain leaves `2^depth`.
    #[inline]
    pub fn leaves(&self) -> usize {
        1 << self.depth
    }

    /// Internal chain nodes, `2^depth - 1`; also the number of rotated cones.
    #[inline]
    pub fn internal(&self) -> usize {
        self.leaves() - 1
    }

    /// Leaves beyond the first `n`, tied to `t`.
    #[inline]
    pub fn padding(&self) -> usize {
        self.leaves() - self.n
    }

    /// `n (n - 1) / 2`.
    #[inline]
    pub fn off_diagonal(&self) -> usize {
        self.n * (self.n - 1) / 2
    }

    #[inline]
    pub fn block_order(&self) -> usize {
        2 * self.n
    }

    #[inline]
    pub fn coupling_rows(&self) -> usize {
        if self.coupling {
            self.off_diagonal()
        } else {
            0
        }
    }

    /// `1 + n + 2(2^l - 1) + 2^l + m n + m`.
    pub fn num_vars(&self) -> usize {
        1 + self.n + 2 * self.internal() + self.leaves() + self.m * self.n + self.m
    }

    /// `m n + m + n + n + (2^l - n) + n(n-1)/2 [+ n(n-1)/2] + 1 + (2^l - 1)`.
    pub fn num_rows(&self) -> usize {
        self.m * self.n
            + self.m
            + 2 * self.n
            + self.padding()
            + self.off_diagonal()
            + self.coupling_rows()
            + 1
            + self.internal()
    }

    /// Block triplets: `m n n` containment, `2n` diagonal ties, one per
    /// off-diagonal zero, one per coupling zero.
    pub fn num_triplets(&self) -> usize {
        self.m * self.n * self.n + 2 * self.n + self.off_diagonal() + self.coupling_rows()
    }

    #[inline]
    pub fn num_cones(&self) -> usize {
        self.internal() + self.m
    }

    /// Total cone operands: three per rotated cone, `n + 1` per quadratic cone.
    #[inline]
    pub fn num_cone_operands(&self) -> usize {
        3 * self.internal() + self.m * (self.n + 1)
    }

    /// `2^{l/2}`: the root of a depth-`l` chain over equal leaves `v` is `2^{l/2} v`.
    #[inline]
    pub fn root_scale(&self) -> f64 {
        2f64.powf(self.depth as f64 / 2.0)
    }
}
