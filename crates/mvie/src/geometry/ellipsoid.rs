//! Ellipsoids `{C u + d : ||u|| <= 1}`.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use super::{unit_ball_volume, Polytope};
use crate::cfg::AXIS_EPS;
use crate::error::MvieError;

/// Image of the unit ball under `u ↦ C u + d`.
///
/// Invariants:
/// - `C` is `n × n` symmetric (PSD for any ellipsoid the solver returns).
/// - `d` has length `n`.
#[derive(Clone, Debug, PartialEq)]
pub struct Ellipsoid {
    pub c: DMatrix<f64>,
    pub d: DVector<f64>,
}

impl Ellipsoid {
    pub fn new(c: DMatrix<f64>, d: DVector<f64>) -> Result<Self, MvieError> {
        if !c.is_square() || c.nrows() != d.len() {
            return Err(MvieError::invalid(format!(
                "C is {}x{} but d has {} entries",
                c.nrows(),
                c.ncols(),
                d.len()
            )));
        }
        Ok(Self { c, d })
    }

    /// Unit ball scaled by `r` around `center`.
    pub fn ball(center: DVector<f64>, r: f64) -> Self {
        let n = center.len();
        Self {
            c: DMatrix::identity(n, n) * r,
            d: center,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.d.len()
    }

    #[inline]
    pub fn det(&self) -> f64 {
        self.c.determinant()
    }

    pub fn volume(&self) -> f64 {
        unit_ball_volume(self.dim()) * self.det().abs()
    }

    /// `max { a·x : x in E } = ||C a|| + a·d` (C symmetric).
    #[inline]
    pub fn support(&self, a: &DVector<f64>) -> f64 {
        (&self.c * a).norm() + a.dot(&self.d)
    }

    /// Semi-axis lengths (eigenvalues of `C`), descending.
    pub fn semi_axes(&self) -> DVector<f64> {
        let mut ev: Vec<f64> = SymmetricEigen::new(self.c.clone())
            .eigenvalues
            .iter()
            .copied()
            .collect();
        ev.sort_by(|a, b| b.total_cmp(a));
        DVector::from_vec(ev)
    }

    /// Membership with relative slack: `x = C u + d` for some `||u|| <= 1 + eps`.
    /// Collapsed axes (eigenvalue below `AXIS_EPS`) admit only offsets up to `eps`.
    pub fn contains_eps(&self, x: &DVector<f64>, eps: f64) -> bool {
        if x.len() != self.dim() {
            return false;
        }
        let eig = SymmetricEigen::new(self.c.clone());
        let y = eig.eigenvectors.transpose() * (x - &self.d);
        let mut sq = 0.0;
        for (lam, yi) in eig.eigenvalues.iter().zip(y.iter()) {
            if *lam > AXIS_EPS {
                sq += (yi / lam).powi(2);
            } else if yi.abs() > eps {
                return false;
            }
        }
        sq.sqrt() <= 1.0 + eps
    }

    /// `max_i (||C a_i|| + a_i·d - b_i)`; non-positive iff `E ⊆ P`.
    pub fn max_containment_violation(&self, poly: &Polytope) -> f64 {
        poly.halfspaces()
            .map(|h| self.support(&h.n) - h.c)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    #[inline]
    pub fn is_inside(&self, poly: &Polytope, eps: f64) -> bool {
        poly.dim() == self.dim() && self.max_containment_violation(poly) <= eps
    }
}
