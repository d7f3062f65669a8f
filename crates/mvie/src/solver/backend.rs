//! `ConicTask` backed by the Clarabel interior-point solver.
//!
//! Clarabel solves `min qᵀx` subject to `A x + s = b`, `s ∈ K`. The task maps
//! the program onto it as follows.
//! - Columns: the scalar variables, then the packed lower triangle of every
//!   matrix variable.
//! - Equality rows and fixed bounds form one `ZeroConeT` block.
//! - Finite sides of range bounds form one `NonnegativeConeT` block.
//! - A quadratic cone is a `SecondOrderConeT` over its members.
//! - A rotated cone `s² <= 2xy` is a `SecondOrderConeT(3)` over
//!   `((x + y)/√2, (x − y)/√2, s)`.
//! - A matrix variable is a `PSDTriangleConeT` over its upper triangle by
//!   columns, off-diagonal entries scaled by √2.

use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettings, DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT::{self, NonnegativeConeT, PSDTriangleConeT, SecondOrderConeT, ZeroConeT},
};
use nalgebra::DMatrix;
use tracing::debug;

use super::{
    BarTriplet, Cone, ConicSolver, ConicTask, LinearRow, Sense, SolutionStatus, SolverError,
    VarBound,
};
use crate::packed::SymPacked;

/// Clarabel stopping criteria.
#[derive(Clone, Copy, Debug)]
pub struct ClarabelCfg {
    pub tol_gap_abs: f64,
    pub tol_gap_rel: f64,
    pub tol_feas: f64,
    pub max_iter: u32,
    /// Print Clarabel's iteration log to stdout.
    pub verbose: bool,
}

impl Default for ClarabelCfg {
    fn default() -> Self {
        Self {
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
            tol_feas: 1e-8,
            max_iter: 200,
            verbose: false,
        }
    }
}

impl ClarabelCfg {
    fn settings(&self) -> Result<DefaultSettings<f64>, SolverError> {
        DefaultSettingsBuilder::default()
            .tol_gap_abs(self.tol_gap_abs)
            .tol_gap_rel(self.tol_gap_rel)
            .tol_feas(self.tol_feas)
            .max_iter(self.max_iter)
            .verbose(self.verbose)
            .build()
            .map_err(|e| SolverError::backend(format!("settings: {e}")))
    }
}

/// Solver "environment": holds the configuration, creates tasks.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClarabelSolver {
    pub cfg: ClarabelCfg,
}

impl ClarabelSolver {
    #[inline]
    pub fn new(cfg: ClarabelCfg) -> Self {
        Self { cfg }
    }
}

impl ConicSolver for ClarabelSolver {
    type Task = ClarabelTask;

    fn create_task(&self, num_vars: usize, num_cons: usize) -> Result<ClarabelTask, SolverError> {
        Ok(ClarabelTask {
            cfg: self.cfg,
            cost: Vec::with_capacity(num_vars),
            bounds: Vec::with_capacity(num_vars),
            bars: Vec::new(),
            rows: Vec::with_capacity(num_cons),
            triplets: Vec::new(),
            cones: Vec::new(),
            owner: Vec::with_capacity(num_vars),
            sense: Sense::Minimize,
            solution: None,
        })
    }
}

/// Program data accumulated through the `ConicTask` calls.
#[derive(Debug)]
pub struct ClarabelTask {
    cfg: ClarabelCfg,
    cost: Vec<f64>,
    bounds: Vec<VarBound>,
    bars: Vec<SymPacked>,
    rows: Vec<LinearRow>,
    triplets: Vec<BarTriplet>,
    cones: Vec<Cone>,
    /// Whether a scalar variable already belongs to a cone.
    owner: Vec<bool>,
    sense: Sense,
    solution: Option<Solved>,
}

#[derive(Debug)]
struct Solved {
    status: SolutionStatus,
    x: Vec<f64>,
    objective: f64,
}

/// `min qᵀx` s.t. `A x + s = b`, `s` in `cones` (stacked in order).
struct Standard {
    a: DMatrix<f64>,
    b: Vec<f64>,
    q: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

impl ClarabelTask {
    #[inline]
    fn num_vars(&self) -> usize {
        self.cost.len()
    }

    /// Status of the last `optimize` call, if any.
    #[inline]
    pub fn status(&self) -> Option<SolutionStatus> {
        self.solution.as_ref().map(|s| s.status)
    }

    fn check_var(&self, var: usize) -> Result<(), SolverError> {
        if var < self.num_vars() {
            Ok(())
        } else {
            Err(SolverError::InvalidIndex {
                what: "variable",
                index: var,
                bound: self.num_vars(),
            })
        }
    }

    fn bar(&self, bar_var: usize) -> Result<&SymPacked, SolverError> {
        self.bars.get(bar_var).ok_or(SolverError::InvalidIndex {
            what: "matrix variable",
            index: bar_var,
            bound: self.bars.len(),
        })
    }

    fn bar_offsets(&self) -> Vec<usize> {
        let mut next = self.num_vars();
        self.bars
            .iter()
            .map(|p| {
                let off = next;
                next += p.len();
                off
            })
            .collect()
    }

    fn standard_form(&self) -> Standard {
        let offsets = self.bar_offsets();
        let width = self.num_vars() + self.bars.iter().map(SymPacked::len).sum::<usize>();

        let fixed: Vec<(usize, f64)> = self
            .bounds
            .iter()
            .enumerate()
            .filter_map(|(var, b)| match *b {
                VarBound::Fixed(v) => Some((var, v)),
                _ => None,
            })
            .collect();
        // (var, coef, rhs): lo <= x as s = x - lo, x <= hi as s = hi - x
        let mut sides = Vec::new();
        for (var, b) in self.bounds.iter().enumerate() {
            if let VarBound::Range { lo, hi } = *b {
                if lo.is_finite() {
                    sides.push((var, -1.0, -lo));
                }
                if hi.is_finite() {
                    sides.push((var, 1.0, hi));
                }
            }
        }

        let eq = self.rows.len() + fixed.len();
        let cone_rows: usize = self.cones.iter().map(Cone::arity).sum();
        let psd_rows: usize = self.bars.iter().map(SymPacked::len).sum();
        let height = eq + sides.len() + cone_rows + psd_rows;

        let mut a = DMatrix::zeros(height, width);
        let mut b = vec![0.0; height];
        let mut cones = Vec::with_capacity(self.cones.len() + self.bars.len() + 2);

        for (r, row) in self.rows.iter().enumerate() {
            for &(var, coef) in &row.terms {
                a[(r, var)] += coef;
            }
            b[r] = row.rhs;
        }
        for t in &self.triplets {
            let col = offsets[t.bar_var] + self.bars[t.bar_var].index_of(t.k, t.l);
            // Symmetric reading: an off-diagonal weight appears at (k, l) and (l, k).
            let coef = if t.k == t.l { t.value } else { 2.0 * t.value };
            a[(t.row, col)] += coef;
        }
        let mut r = self.rows.len();
        for &(var, v) in &fixed {
            a[(r, var)] = 1.0;
            b[r] = v;
            r += 1;
        }
        if eq > 0 {
            cones.push(ZeroConeT(eq));
        }

        for &(var, coef, rhs) in &sides {
            a[(r, var)] = coef;
            b[r] = rhs;
            r += 1;
        }
        if !sides.is_empty() {
            cones.push(NonnegativeConeT(sides.len()));
        }

        for cone in &self.cones {
            match cone {
                Cone::Quadratic { .. } => {
                    for var in cone.members() {
                        a[(r, var)] = -1.0;
                        r += 1;
                    }
                }
                Cone::RotatedQuadratic { x, y, s } => {
                    a[(r, *x)] = -FRAC_1_SQRT_2;
                    a[(r, *y)] = -FRAC_1_SQRT_2;
                    a[(r + 1, *x)] = -FRAC_1_SQRT_2;
                    a[(r + 1, *y)] = FRAC_1_SQRT_2;
                    a[(r + 2, *s)] = -1.0;
                    r += 3;
                }
            }
            cones.push(SecondOrderConeT(cone.arity()));
        }

        for (packed, &off) in self.bars.iter().zip(&offsets) {
            for j in 0..packed.order() {
                for i in 0..=j {
                    let scale = if i == j { 1.0 } else { SQRT_2 };
                    a[(r, off + packed.index_of(i, j))] = -scale;
                    r += 1;
                }
            }
            cones.push(PSDTriangleConeT(packed.order()));
        }

        let sign = match self.sense {
            Sense::Maximize => -1.0,
            Sense::Minimize => 1.0,
        };
        let mut q = vec![0.0; width];
        for (var, &c) in self.cost.iter().enumerate() {
            q[var] = sign * c;
        }

        Standard { a, b, q, cones }
    }
}

impl ConicTask for ClarabelTask {
    fn append_vars(&mut self, count: usize) -> Result<(), SolverError> {
        let n = self.num_vars() + count;
        self.cost.resize(n, 0.0);
        self.bounds.resize(n, VarBound::Free);
        self.owner.resize(n, false);
        Ok(())
    }

    fn append_sym_matrix_var(&mut self, order: usize) -> Result<usize, SolverError> {
        if order == 0 {
            return Err(SolverError::InvalidIndex {
                what: "matrix variable order",
                index: 0,
                bound: 1,
            });
        }
        self.bars.push(SymPacked::new(order));
        Ok(self.bars.len() - 1)
    }

    fn put_objective_coef(&mut self, var: usize, weight: f64) -> Result<(), SolverError> {
        self.check_var(var)?;
        self.cost[var] = weight;
        Ok(())
    }

    fn put_var_bound(&mut self, var: usize, bound: VarBound) -> Result<(), SolverError> {
        self.check_var(var)?;
        if let VarBound::Range { lo, hi } = bound {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(SolverError::InvalidBound { var, lo, hi });
            }
        }
        self.bounds[var] = bound;
        Ok(())
    }

    fn append_row(&mut self, row: &LinearRow) -> Result<usize, SolverError> {
        for &(var, _) in &row.terms {
            self.check_var(var)?;
        }
        self.rows.push(row.clone());
        Ok(self.rows.len() - 1)
    }

    fn put_bar_triplets(&mut self, triplets: &[BarTriplet]) -> Result<(), SolverError> {
        for t in triplets {
            if t.row >= self.rows.len() {
                return Err(SolverError::InvalidIndex {
                    what: "row",
                    index: t.row,
                    bound: self.rows.len(),
                });
            }
            let order = self.bar(t.bar_var)?.order();
            if t.k >= order || t.l > t.k {
                return Err(SolverError::InvalidIndex {
                    what: "lower-triangle block entry",
                    index: t.k * order + t.l,
                    bound: order * order,
                });
            }
        }
        self.triplets.extend_from_slice(triplets);
        Ok(())
    }

    fn append_cone(&mut self, cone: &Cone) -> Result<(), SolverError> {
        let members = cone.members();
        if members.len() < 2 {
            return Err(SolverError::cone("a cone needs at least two operands"));
        }
        for (pos, &var) in members.iter().enumerate() {
            self.check_var(var)?;
            if members[..pos].contains(&var) {
                return Err(SolverError::cone(format!("variable {var} repeated in one cone")));
            }
            if self.owner[var] {
                return Err(SolverError::cone(format!(
                    "variable {var} belongs to more than one cone"
                )));
            }
        }
        for &var in &members {
            self.owner[var] = true;
        }
        self.cones.push(cone.clone());
        Ok(())
    }

    fn put_sense(&mut self, sense: Sense) -> Result<(), SolverError> {
        self.sense = sense;
        Ok(())
    }

    fn optimize(&mut self) -> Result<SolutionStatus, SolverError> {
        let form = self.standard_form();
        let (height, width) = form.a.shape();
        debug!(
            columns = width,
            rows = height,
            cones = form.cones.len(),
            "clarabel optimize"
        );
        let p = CscMatrix::zeros((width, width));
        let a = dense_to_csc(&form.a);
        let mut solver =
            DefaultSolver::new(&p, &form.q, &a, &form.b, &form.cones, self.cfg.settings()?)
                .map_err(|e| SolverError::backend(format!("{e:?}")))?;
        solver.solve();

        let status = map_status(solver.solution.status);
        let x = solver.solution.x.clone();
        let objective = self.cost.iter().zip(&x).map(|(c, v)| c * v).sum::<f64>();
        debug!(%status, objective, "clarabel finished");
        self.solution = Some(Solved {
            status,
            x,
            objective,
        });
        Ok(status)
    }

    fn primal(&self) -> Result<Vec<f64>, SolverError> {
        let sol = self.solution.as_ref().ok_or(SolverError::NotSolved)?;
        Ok(sol.x[..self.num_vars()].to_vec())
    }

    fn bar_primal(&self, bar_var: usize) -> Result<Vec<f64>, SolverError> {
        let sol = self.solution.as_ref().ok_or(SolverError::NotSolved)?;
        let len = self.bar(bar_var)?.len();
        let off = self.bar_offsets()[bar_var];
        Ok(sol.x[off..off + len].to_vec())
    }

    fn primal_objective(&self) -> Result<f64, SolverError> {
        let sol = self.solution.as_ref().ok_or(SolverError::NotSolved)?;
        Ok(sol.objective)
    }
}

fn map_status(status: SolverStatus) -> SolutionStatus {
    match status {
        SolverStatus::Solved => SolutionStatus::Optimal,
        SolverStatus::AlmostSolved => SolutionStatus::NearOptimal,
        SolverStatus::PrimalInfeasible => SolutionStatus::PrimalInfeasibleCertificate,
        SolverStatus::DualInfeasible => SolutionStatus::DualInfeasibleCertificate,
        SolverStatus::AlmostPrimalInfeasible => SolutionStatus::NearPrimalInfeasibleCertificate,
        SolverStatus::AlmostDualInfeasible => SolutionStatus::NearDualInfeasibleCertificate,
        SolverStatus::Unsolved => SolutionStatus::Other(0),
        _ => SolutionStatus::Unknown,
    }
}

/// Column-compressed copy of a dense matrix, zeros dropped.
fn dense_to_csc(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    for j in 0..ncols {
        for i in 0..nrows {
            let v = m[(i, j)];
            if v != 0.0 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }
    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}
