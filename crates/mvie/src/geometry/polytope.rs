//! H-representation `{x : A x <= b}`.

use nalgebra::{DMatrix, DVector};

use crate::cfg::{FEAS_EPS, ROW_NORM_EPS};
use crate::error::MvieError;

/// Closed half-space `n · x <= c`.
///
/// Invariants:
/// - `n` is not normalized; `c` is any finite real.
#[derive(Clone, Debug, PartialEq)]
pub struct Halfspace {
    pub n: DVector<f64>,
    pub c: f64,
}

impl Halfspace {
    #[inline]
    pub fn new(n: DVector<f64>, c: f64) -> Self {
        Self { n, c }
    }

    #[inline]
    pub fn satisfies_eps(&self, x: &DVector<f64>, eps: f64) -> bool {
        self.n.dot(x) <= self.c + eps
    }
}

/// Polytope `{x : A x <= b}` in R^n with `m` half-spaces.
///
/// Invariants:
/// - `A` is `m × n` with `n >= 1`, `b` has length `m`, every entry is finite.
/// - Boundedness and a non-empty interior are not checked here; without them
///   the inscribed-ellipsoid program is infeasible or unbounded.
#[derive(Clone, Debug, PartialEq)]
pub struct Polytope {
    a: DMatrix<f64>,
    b: DVector<f64>,
}

impl Polytope {
    pub fn new(a: DMatrix<f64>, b: DVector<f64>) -> Result<Self, MvieError> {
        if a.ncols() == 0 {
            return Err(MvieError::invalid("dimension must be at least 1"));
        }
        if a.nrows() != b.len() {
            return Err(MvieError::invalid(format!(
                "A has {} rows but b has {} entries",
                a.nrows(),
                b.len()
            )));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(MvieError::invalid("A and b must be finite"));
        }
        Ok(Self { a, b })
    }

    /// From row-major coefficient rows and offsets.
    pub fn from_rows(rows: &[Vec<f64>], b: &[f64]) -> Result<Self, MvieError> {
        let n = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != n) {
            return Err(MvieError::invalid(format!(
                "row {bad} has {} entries, expected {n}",
                rows[bad].len()
            )));
        }
        let a = DMatrix::from_fn(rows.len(), n, |i, j| rows[i][j]);
        Self::new(a, DVector::from_column_slice(b))
    }

    pub fn from_halfspaces(hs: &[Halfspace]) -> Result<Self, MvieError> {
        let n = hs.first().map_or(0, |h| h.n.len());
        if hs.iter().any(|h| h.n.len() != n) {
            return Err(MvieError::invalid("half-space normals differ in dimension"));
        }
        let a = DMatrix::from_fn(hs.len(), n, |i, j| hs[i].n[j]);
        let b = DVector::from_iterator(hs.len(), hs.iter().map(|h| h.c));
        Self::new(a, b)
    }

    /// `[0, 1]^n`, rows ordered `x_j <= 1`, `-x_j <= 0` per axis.
    pub fn unit_box(n: usize) -> Result<Self, MvieError> {
        Self::axis_box(&vec![0.0; n], &vec![1.0; n])
    }

    /// Axis-aligned box `lo <= x <= hi`.
    pub fn axis_box(lo: &[f64], hi: &[f64]) -> Result<Self, MvieError> {
        if lo.len() != hi.len() {
            return Err(MvieError::invalid("box bounds differ in dimension"));
        }
        if lo.iter().zip(hi).any(|(l, h)| !(l < h)) {
            return Err(MvieError::invalid("box needs lo < hi on every axis"));
        }
        let n = lo.len();
        let mut a = DMatrix::zeros(2 * n, n);
        let mut b = DVector::zeros(2 * n);
        for j in 0..n {
            a[(2 * j, j)] = 1.0;
            b[2 * j] = hi[j];
            a[(2 * j + 1, j)] = -1.0;
            b[2 * j + 1] = -lo[j];
        }
        Self::new(a, b)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.a.ncols()
    }

    #[inline]
    pub fn num_halfspaces(&self) -> usize {
        self.a.nrows()
    }

    #[inline]
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    #[inline]
    pub fn b(&self) -> &DVector<f64> {
        &self.b
    }

    pub fn halfspace(&self, i: usize) -> Halfspace {
        Halfspace::new(self.a.row(i).transpose(), self.b[i])
    }

    pub fn halfspaces(&self) -> impl Iterator<Item = Halfspace> + '_ {
        (0..self.num_halfspaces()).map(move |i| self.halfspace(i))
    }

    /// Per-row slack `b - A x`; non-negative exactly on the polytope.
    pub fn slack(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.b - &self.a * x
    }

    pub fn contains_eps(&self, x: &DVector<f64>, eps: f64) -> bool {
        x.len() == self.dim() && self.slack(x).iter().all(|&s| s >= -eps)
    }

    #[inline]
    pub fn contains(&self, x: &DVector<f64>) -> bool {
        self.contains_eps(x, FEAS_EPS)
    }

    /// Same set with unit-norm rows. Fails on (near) zero rows.
    pub fn normalized(&self) -> Result<Self, MvieError> {
        let mut a = self.a.clone();
        let mut b = self.b.clone();
        for i in 0..a.nrows() {
            let norm = a.row(i).norm();
            if norm < ROW_NORM_EPS {
                return Err(MvieError::invalid(format!("row {i} of A is zero")));
            }
            a.row_mut(i).unscale_mut(norm);
            b[i] /= norm;
        }
        Ok(Self { a, b })
    }
}
