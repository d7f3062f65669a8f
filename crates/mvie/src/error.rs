//! Error taxonomy for one inner-ellipsoid call.
//!
//! Every failure aborts the call and leaves no ellipsoid behind. Callers that
//! need the integer status of the C-style interface use `status_code`.

use std::fmt;

use crate::solver::{SolutionStatus, SolverError};

/// Status code of a successful call.
pub const STATUS_OK: i32 = 0;

#[derive(Debug)]
pub enum MvieError {
    /// Input shapes or values are unusable (empty dimension, too few halfspaces, NaN).
    InvalidInput { reason: String },
    /// Emitted rows, triplets or cone operands disagree with the precomputed counts.
    /// Never expected in correct operation.
    ConstructionDefect {
        what: &'static str,
        expected: usize,
        emitted: usize,
    },
    /// The solver rejected a setup call or failed while optimizing.
    Solver(SolverError),
    /// A primal or dual infeasibility certificate was reported.
    Infeasible { status: SolutionStatus },
    /// The solver could not determine the solution status.
    Indeterminate,
    /// Any status not handled above; the raw status is kept for diagnostics.
    UnrecognizedStatus { raw: SolutionStatus },
}

impl MvieError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn defect(what: &'static str, expected: usize, emitted: usize) -> Self {
        Self::ConstructionDefect {
            what,
            expected,
            emitted,
        }
    }

    /// Non-zero integer status for this failure (`STATUS_OK` is reserved for success).
    pub fn status_code(&self) -> i32 {
        match self {
            Self::InvalidInput { .. } => 1,
            Self::ConstructionDefect { .. } => 2,
            Self::Solver(_) => 3,
            Self::Infeasible { .. } => 4,
            Self::Indeterminate => 5,
            Self::UnrecognizedStatus { .. } => 6,
        }
    }
}

impl fmt::Display for MvieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { reason } => write!(f, "invalid polytope: {reason}"),
            Self::ConstructionDefect {
                what,
                expected,
                emitted,
            } => write!(
                f,
                "internal layout defect: expected {expected} {what}, emitted {emitted}"
            ),
            Self::Solver(err) => write!(f, "inner-ellipsoid construction failed: {err}"),
            Self::Infeasible { status } => write!(
                f,
                "polytope admits no positive-volume inscribed ellipsoid (solver status {status})"
            ),
            Self::Indeterminate => write!(f, "the solution status could not be determined"),
            Self::UnrecognizedStatus { raw } => write!(f, "unrecognized solution status {raw}"),
        }
    }
}

impl std::error::Error for MvieError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Solver(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SolverError> for MvieError {
    fn from(err: SolverError) -> Self {
        Self::Solver(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_distinct_and_nonzero() {
        let errs = [
            MvieError::invalid("x"),
            MvieError::defect("rows", 3, 2),
            MvieError::Solver(SolverError::NotSolved),
            MvieError::Infeasible {
                status: SolutionStatus::PrimalInfeasibleCertificate,
            },
            MvieError::Indeterminate,
            MvieError::UnrecognizedStatus {
                raw: SolutionStatus::Other(17),
            },
        ];
        let mut codes: Vec<i32> = errs.iter().map(|e| e.status_code()).collect();
        assert!(codes.iter().all(|&c| c != STATUS_OK));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errs.len());
    }

    #[test]
    fn solver_failures_read_as_construction_failures() {
        let err: MvieError = SolverError::NotSolved.into();
        let msg = err.to_string();
        assert!(msg.starts_with("inner-ellipsoid construction failed"), "{msg}");
        assert!(std::error::Error::source(&err).is_some());
    }
}
