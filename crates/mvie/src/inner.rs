//! Entry points: polytope in, maximum-volume inscribed ellipsoid out.
//!
//! One call compiles the program, opens one solver task, loads and optimizes it
//! once, reads the primal values and drops the task before extraction. Every
//! failure is returned as `MvieError`; no partial ellipsoid is produced.

use tracing::{info, warn};

use crate::error::MvieError;
use crate::extract::{check_status, extract_ellipsoid};
use crate::geometry::{unit_ball_volume, Ellipsoid, Polytope};
use crate::program::{compile, ConicProgram, FormulationCfg};
use crate::solver::{ConicSolver, ConicTask, SolutionStatus};

/// Solved ellipsoid with the optimal objective `t`.
#[derive(Clone, Debug, PartialEq)]
pub struct InnerEllipsoid {
    pub ellipsoid: Ellipsoid,
    /// Optimal `t`, the geometric mean bound `t <= det(C)^{1/n}`.
    pub objective: f64,
    pub status: SolutionStatus,
}

impl InnerEllipsoid {
    /// `t^n`, the determinant bound carried by the objective.
    #[inline]
    pub fn det_volume(&self) -> f64 {
        self.objective.powi(self.ellipsoid.dim() as i32)
    }

    /// Euclidean volume implied by the objective, `unit_ball_volume(n) · t^n`.
    #[inline]
    pub fn volume(&self) -> f64 {
        unit_ball_volume(self.ellipsoid.dim()) * self.det_volume()
    }
}

/// Maximum-volume ellipsoid inscribed in `poly`, default formulation.
pub fn inner_ellipsoid<S: ConicSolver>(
    poly: &Polytope,
    solver: &S,
) -> Result<InnerEllipsoid, MvieError> {
    inner_ellipsoid_with(poly, solver, FormulationCfg::default())
}

pub fn inner_ellipsoid_with<S: ConicSolver>(
    poly: &Polytope,
    solver: &S,
    cfg: FormulationCfg,
) -> Result<InnerEllipsoid, MvieError> {
    let program = compile(poly, cfg)?;
    let solved = run(&program, solver).and_then(|solved| {
        let ellipsoid = extract_ellipsoid(&program.layout, &solved.primal, &solved.bar)?;
        Ok((solved, ellipsoid))
    });
    let (solved, ellipsoid) = match solved {
        Ok(pair) => pair,
        Err(err) => {
            warn!(n = poly.dim(), m = poly.num_halfspaces(), %err, "inner ellipsoid failed");
            return Err(err);
        }
    };
    info!(
        n = poly.dim(),
        m = poly.num_halfspaces(),
        status = %solved.status,
        objective = solved.objective,
        "inner ellipsoid solved"
    );
    Ok(InnerEllipsoid {
        ellipsoid,
        objective: solved.objective,
        status: solved.status,
    })
}

struct Solved {
    status: SolutionStatus,
    primal: Vec<f64>,
    bar: Vec<f64>,
    objective: f64,
}

/// Solver round trip; the task lives only inside this scope.
fn run<S: ConicSolver>(program: &ConicProgram, solver: &S) -> Result<Solved, MvieError> {
    let mut task = solver.create_task(program.num_vars(), program.num_rows())?;
    program.load(&mut task)?;
    let status = task.optimize()?;
    check_status(status)?;
    Ok(Solved {
        status,
        primal: task.primal()?,
        bar: task.bar_primal(program.layout.bar().index)?,
        objective: task.primal_objective()?,
    })
}
