//! Maximum-volume ellipsoid inscribed in an H-polytope, via a conic program.
//!
//! Pipeline (one call, no state kept between calls):
//! dimension → layout → linear rows + PSD block triplets → cones → solve → extract.
//!
//! - `program`: compiles a `Polytope` into a solver-ready `ConicProgram`.
//! - `solver`: the collaborator contract (`ConicSolver`/`ConicTask`) and its
//!   implementation on the Clarabel interior-point solver (`ClarabelSolver`).
//! - `extract`: status handling and mapping of primal values back to `(C, d)`.
//! - `inner`: the entry points tying the above together.
//! - `random`: seeded polytope generators for tests, benches and the CLI.
//!
//! Conventions
//! - Half-spaces are `a_i · x <= b_i`; rows of `A` need not be normalized.
//! - Ellipsoids are `{ C u + d : ||u||_2 <= 1 }` with `C` symmetric PSD.

pub(crate) mod cfg;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod inner;
pub mod packed;
pub mod program;
pub mod random;
pub mod solver;

pub use error::{MvieError, STATUS_OK};
pub use geometry::{unit_ball_volume, Ellipsoid, Polytope};
pub use inner::{inner_ellipsoid, inner_ellipsoid_with, InnerEllipsoid};
pub use packed::SymPacked;
pub use program::{compile, ConicProgram, FormulationCfg, ProblemDims, VarLayout};
pub use solver::{ClarabelCfg, ClarabelSolver, ConicSolver, ConicTask, SolutionStatus};

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::geometry::{unit_ball_volume, Ellipsoid, Polytope};
    pub use crate::inner::{inner_ellipsoid, inner_ellipsoid_with, InnerEllipsoid};
    pub use crate::program::FormulationCfg;
    pub use crate::solver::{ClarabelCfg, ClarabelSolver, SolutionStatus};
    pub use crate::MvieError;
    pub use nalgebra::{DMatrix, DVector};
}
