//! Status classification and mapping solver values back to `(C, d)`.

use nalgebra::{DMatrix, DVector};

use crate::error::MvieError;
use crate::geometry::Ellipsoid;
use crate::packed::SymPacked;
use crate::program::VarLayout;
use crate::solver::SolutionStatus;

/// `Ok` for statuses whose primal values may be read; the matching error otherwise.
pub fn check_status(status: SolutionStatus) -> Result<(), MvieError> {
    use SolutionStatus::*;
    match status {
        Optimal | NearOptimal => Ok(()),
        PrimalInfeasibleCertificate
        | DualInfeasibleCertificate
        | NearPrimalInfeasibleCertificate
        | NearDualInfeasibleCertificate => Err(MvieError::Infeasible { status }),
        Unknown => Err(MvieError::Indeterminate),
        PrimalFeasible | DualFeasible | Other(_) => {
            Err(MvieError::UnrecognizedStatus { raw: status })
        }
    }
}

/// `C` from the leading `n × n` block of the packed matrix value, `d` from the
/// scalar values. Entries outside the leading block are skipped.
pub fn extract_ellipsoid(
    layout: &VarLayout,
    primal: &[f64],
    bar_packed: &[f64],
) -> Result<Ellipsoid, MvieError> {
    let bar = layout.bar();
    let packing = SymPacked::new(bar.order);
    if primal.len() != layout.num_vars() {
        return Err(MvieError::defect(
            "primal values",
            layout.num_vars(),
            primal.len(),
        ));
    }
    if bar_packed.len() != packing.len() {
        return Err(MvieError::defect(
            "matrix entries",
            packing.len(),
            bar_packed.len(),
        ));
    }
    let n = bar.order / 2;
    let mut c = DMatrix::zeros(n, n);
    packing.unpack_leading_into(bar_packed, n, &mut c);
    let d = DVector::from_fn(n, |k, _| primal[layout.d(k)]);
    Ellipsoid::new(c, d)
}
