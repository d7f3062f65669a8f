//! Conic solver contract and its Clarabel-backed implementation.
//!
//! Contract
//! - A `ConicSolver` hands out one `ConicTask` per program. The task owns all
//!   solver-side state; dropping it releases everything, on success and error
//!   paths alike.
//! - Scalar variables are indexed `0..num_vars`. Matrix variables are separate
//!   symmetric blocks addressed by `(bar_var, row, col)` in their lower triangle.
//! - Rows are equalities `Σ coef·x_v + Σ_blocks <Ā, X> = rhs`. Block triplets are
//!   read as a symmetric matrix: an off-diagonal weight `w` at `(k, l)` also sits
//!   at `(l, k)`, so it contributes `2w · X_kl`.
//! - Each scalar variable belongs to at most one cone.

mod backend;

use std::fmt;

pub use backend::{ClarabelCfg, ClarabelSolver, ClarabelTask};

/// Bound on a scalar variable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VarBound {
    Free,
    Fixed(f64),
    /// `lo < x < hi`; either side may be infinite.
    Range { lo: f64, hi: f64 },
}

/// Objective sense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

/// Equality row `Σ coef · x_var (+ block triplets of the same row) = rhs`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearRow {
    pub terms: Vec<(usize, f64)>,
    pub rhs: f64,
}

impl LinearRow {
    #[inline]
    pub fn new(terms: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self { terms, rhs }
    }
}

/// One lower-triangle entry `(k, l)`, `k >= l`, of the matrix that row `row`
/// applies to matrix variable `bar_var`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarTriplet {
    pub row: usize,
    pub bar_var: usize,
    pub k: usize,
    pub l: usize,
    pub value: f64,
}

/// Kind tag of a cone membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConeKind {
    Quadratic,
    RotatedQuadratic,
}

/// Cone membership over scalar variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cone {
    /// `||tail||_2 <= head`.
    Quadratic { head: usize, tail: Vec<usize> },
    /// `s^2 <= 2 x y`, `x, y >= 0`.
    RotatedQuadratic { x: usize, y: usize, s: usize },
}

impl Cone {
    #[inline]
    pub fn kind(&self) -> ConeKind {
        match self {
            Cone::Quadratic { .. } => ConeKind::Quadratic,
            Cone::RotatedQuadratic { .. } => ConeKind::RotatedQuadratic,
        }
    }

    /// Operands in solver order (`head, tail..` or `x, y, s`).
    pub fn members(&self) -> Vec<usize> {
        match self {
            Cone::Quadratic { head, tail } => {
                let mut out = Vec::with_capacity(tail.len() + 1);
                out.push(*head);
                out.extend_from_slice(tail);
                out
            }
            Cone::RotatedQuadratic { x, y, s } => vec![*x, *y, *s],
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        match self {
            Cone::Quadratic { tail, .. } => tail.len() + 1,
            Cone::RotatedQuadratic { .. } => 3,
        }
    }
}

/// Solution status after `optimize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolutionStatus {
    Optimal,
    NearOptimal,
    PrimalFeasible,
    DualFeasible,
    PrimalInfeasibleCertificate,
    DualInfeasibleCertificate,
    NearPrimalInfeasibleCertificate,
    NearDualInfeasibleCertificate,
    Unknown,
    /// Backend-specific status code outside the list above.
    Other(i32),
}

impl SolutionStatus {
    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self, Self::Optimal | Self::NearOptimal)
    }

    #[inline]
    pub fn is_infeasibility_certificate(&self) -> bool {
        matches!(
            self,
            Self::PrimalInfeasibleCertificate
                | Self::DualInfeasibleCertificate
                | Self::NearPrimalInfeasibleCertificate
                | Self::NearDualInfeasibleCertificate
        )
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimal => write!(f, "OPTIMAL"),
            Self::NearOptimal => write!(f, "NEAR_OPTIMAL"),
            Self::PrimalFeasible => write!(f, "PRIM_FEAS"),
            Self::DualFeasible => write!(f, "DUAL_FEAS"),
            Self::PrimalInfeasibleCertificate => write!(f, "PRIM_INFEAS_CER"),
            Self::DualInfeasibleCertificate => write!(f, "DUAL_INFEAS_CER"),
            Self::NearPrimalInfeasibleCertificate => write!(f, "NEAR_PRIM_INFEAS_CER"),
            Self::NearDualInfeasibleCertificate => write!(f, "NEAR_DUAL_INFEAS_CER"),
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::Other(code) => write!(f, "OTHER({code})"),
        }
    }
}

/// Failures of solver setup calls and of the optimizer itself.
#[derive(Debug)]
pub enum SolverError {
    /// A variable, row, block or block entry index is out of range.
    InvalidIndex {
        what: &'static str,
        index: usize,
        bound: usize,
    },
    /// Malformed cone (too short, repeated operand, overlap with another cone).
    InvalidCone { reason: String },
    /// Range bound with `lo > hi` or a NaN side.
    InvalidBound { var: usize, lo: f64, hi: f64 },
    /// The backend rejected the assembled data or its settings.
    Backend { reason: String },
    /// Solution values were requested before `optimize` produced them.
    NotSolved,
}

impl SolverError {
    pub(crate) fn cone(reason: impl Into<String>) -> Self {
        Self::InvalidCone {
            reason: reason.into(),
        }
    }

    pub(crate) fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndex { what, index, bound } => {
                write!(f, "{what} index {index} out of range (< {bound})")
            }
            Self::InvalidCone { reason } => write!(f, "invalid cone: {reason}"),
            Self::InvalidBound { var, lo, hi } => {
                write!(f, "empty bound range [{lo}, {hi}] on variable {var}")
            }
            Self::Backend { reason } => write!(f, "solver backend: {reason}"),
            Self::NotSolved => write!(f, "no solution available; call optimize first"),
        }
    }
}

impl std::error::Error for SolverError {}

/// Factory for solver tasks (the solver "environment").
pub trait ConicSolver {
    type Task: ConicTask;

    /// New empty task; `num_vars`/`num_cons` are capacity hints.
    fn create_task(&self, num_vars: usize, num_cons: usize) -> Result<Self::Task, SolverError>;
}

/// One conic program inside the solver. Dropping the task releases it.
pub trait ConicTask {
    /// Append `count` scalar variables (free, zero objective).
    fn append_vars(&mut self, count: usize) -> Result<(), SolverError>;
    /// Append a symmetric PSD matrix variable; returns its block index.
    fn append_sym_matrix_var(&mut self, order: usize) -> Result<usize, SolverError>;
    fn put_objective_coef(&mut self, var: usize, weight: f64) -> Result<(), SolverError>;
    fn put_var_bound(&mut self, var: usize, bound: VarBound) -> Result<(), SolverError>;
    /// Append an equality row; returns its index.
    fn append_row(&mut self, row: &LinearRow) -> Result<usize, SolverError>;
    fn put_bar_triplets(&mut self, triplets: &[BarTriplet]) -> Result<(), SolverError>;
    fn append_cone(&mut self, cone: &Cone) -> Result<(), SolverError>;
    fn put_sense(&mut self, sense: Sense) -> Result<(), SolverError>;
    /// Run the optimizer once.
    fn optimize(&mut self) -> Result<SolutionStatus, SolverError>;
    /// Primal scalar values, `num_vars` long.
    fn primal(&self) -> Result<Vec<f64>, SolverError>;
    /// Primal value of a matrix variable, packed lower triangle (see `SymPacked`).
    fn bar_primal(&self, bar_var: usize) -> Result<Vec<f64>, SolverError>;
    fn primal_objective(&self) -> Result<f64, SolverError>;
}
