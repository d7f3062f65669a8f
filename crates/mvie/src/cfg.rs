//! Tolerance defaults (internal).
//!
//! Policy
//! - Fixed constants, like the geometry tolerances they sit next to. Solver
//!   tolerances are configurable through `ClarabelCfg` instead.

/// Membership epsilon for `Polytope::contains_eps` callers that want a default.
pub(crate) const FEAS_EPS: f64 = 1e-9;
/// Rows of `A` with a smaller norm are treated as zero rows.
pub(crate) const ROW_NORM_EPS: f64 = 1e-12;
/// Eigenvalues of `C` below this are treated as collapsed semi-axes.
pub(crate) const AXIS_EPS: f64 = 1e-12;
