//! Compile a polytope into the conic program whose optimum is its maximum-volume
//! inscribed ellipsoid.
//!
//! Formulation
//! - Maximize `t` over `C ⪰ 0` (upper-left block of one `2n × 2n` PSD variable)
//!   and `d`, with `||C a_i|| <= b_i - a_i·d` for every half-space
//!   (quadratic cones over `g_i` and `f_i = C a_i`).
//! - `t` is bounded by the geometric mean of `z_0..z_{n-1}` through a balanced
//!   tree of rotated-quadratic cones; leaves past `n` equal `t`.
//! - The `z_j` sit on the diagonal of the coupling block and of the lower-right
//!   block. With triangular coupling, `X ⪰ 0` implies `det C >= Π z_j`, so the
//!   optimum `t` is `det(C)^{1/n}` of the maximum-volume ellipsoid.
//!
//! Steps
//! - `ProblemDims` fixes all sizes; `VarLayout` assigns indices; the constraint
//!   and cone builders emit into append-only lists and compare their totals with
//!   `ProblemDims` (mismatch → `MvieError::ConstructionDefect`).
//! - `ConicProgram::load` replays the program into any `ConicTask`.

mod cones;
mod constraints;
mod dims;
mod layout;

use tracing::debug;

pub use cones::chain_pairs;
pub use dims::ProblemDims;
pub use layout::{BarVar, VarLayout};

use crate::error::MvieError;
use crate::geometry::Polytope;
use crate::solver::{BarTriplet, Cone, ConicTask, LinearRow, Sense, VarBound};

/// Formulation switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormulationCfg {
    /// Zero the strictly lower part of the coupling block, which makes the
    /// objective `det(C)^{1/n}` exactly. Without these rows the program only
    /// bounds `t` by the product of the diagonal of `C`.
    pub triangular_coupling: bool,
}

impl Default for FormulationCfg {
    fn default() -> Self {
        Self {
            triangular_coupling: true,
        }
    }
}

/// Solver-independent conic program. Built once per call.
#[derive(Clone, Debug)]
pub struct ConicProgram {
    pub dims: ProblemDims,
    pub layout: VarLayout,
    pub rows: Vec<LinearRow>,
    pub triplets: Vec<BarTriplet>,
    pub cones: Vec<Cone>,
    pub objective: Vec<(usize, f64)>,
    pub sense: Sense,
}

/// Build the program for `poly`.
///
/// The default formulation adds `n(n-1)/2` coupling rows (and triplets) to make
/// the objective exact. `FormulationCfg { triangular_coupling: false }` emits
/// only the base relations, with `mn + m + 2n + (2^l - n) + 1 + n(n-1)/2 + 2^l - 1`
/// rows.
pub fn compile(poly: &Polytope, cfg: FormulationCfg) -> Result<ConicProgram, MvieError> {
    let dims = ProblemDims::new(poly.dim(), poly.num_halfspaces(), cfg)?;
    let layout = VarLayout::new(&dims);
    let (rows, triplets) = constraints::build(poly, &dims, &layout)?;
    let cones = cones::build(&dims, &layout)?;
    debug!(
        n = dims.n,
        m = dims.m,
        depth = dims.depth,
        vars = layout.num_vars(),
        rows = rows.len(),
        triplets = triplets.len(),
        cones = cones.len(),
        coupling = dims.coupling,
        "compiled inner-ellipsoid program"
    );
    Ok(ConicProgram {
        objective: vec![(layout.t(), 1.0)],
        sense: Sense::Maximize,
        dims,
        layout,
        rows,
        triplets,
        cones,
    })
}

impl ConicProgram {
    #[inline]
    pub fn num_vars(&self) -> usize {
        self.layout.num_vars()
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Replay the program into a fresh `task`.
    pub fn load<T: ConicTask>(&self, task: &mut T) -> Result<(), MvieError> {
        let num_vars = self.num_vars();
        task.append_vars(num_vars)?;
        let bar = self.layout.bar();
        let got = task.append_sym_matrix_var(bar.order)?;
        if got != bar.index {
            return Err(MvieError::defect("matrix variable index", bar.index, got));
        }
        for v in 0..num_vars {
            task.put_var_bound(v, VarBound::Free)?;
        }
        for (k, row) in self.rows.iter().enumerate() {
            let got = task.append_row(row)?;
            if got != k {
                return Err(MvieError::defect("row index", k, got));
            }
        }
        task.put_bar_triplets(&self.triplets)?;
        for cone in &self.cones {
            task.append_cone(cone)?;
        }
        for &(v, w) in &self.objective {
            task.put_objective_coef(v, w)?;
        }
        task.put_sense(self.sense)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
