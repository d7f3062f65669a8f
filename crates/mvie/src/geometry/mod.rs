//! H-polytopes and ellipsoids in R^n.
//!
//! Conventions
//! - Half-spaces use `a · x <= b`; rows are kept at the caller's scaling.
//!   `Polytope::normalized` rescales to unit normals when a caller wants that.
//! - Ellipsoids are images of the unit ball, `{C u + d : ||u|| <= 1}`, with `C`
//!   symmetric PSD. Volume is `unit_ball_volume(n) · det C`.
//! - Membership tests take an explicit epsilon; `cfg::FEAS_EPS` is the default.

mod ellipsoid;
mod polytope;

pub use ellipsoid::Ellipsoid;
pub use polytope::{Halfspace, Polytope};

/// Volume of the Euclidean unit ball in R^n.
///
/// Recurrence `V_n = 2π/n · V_{n-2}` from `V_0 = 1`, `V_1 = 2`.
pub fn unit_ball_volume(n: usize) -> f64 {
    let (mut v, start) = if n % 2 == 0 { (1.0, 2) } else { (2.0, 3) };
    let mut k = start;
    while k <= n {
        v *= 2.0 * std::f64::consts::PI / k as f64;
        k += 2;
    }
    v
}
