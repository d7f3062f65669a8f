//! Geometric-mean chain and containment cones.

use tracing::trace;

use super::dims::ProblemDims;
use super::layout::VarLayout;
use crate::error::MvieError;
use crate::solver::Cone;

/// Operand `idx` of the chain sequence `z ++ s'`.
#[inline]
fn chain_operand(dims: &ProblemDims, layout: &VarLayout, idx: usize) -> usize {
    if idx < dims.leaves() {
        layout.z(idx)
    } else {
        layout.sprime(idx - dims.leaves())
    }
}

/// Node `j` of the balanced tree reads operands `2j` and `2j + 1` of `z ++ s'`:
/// the leaves pair up first, then each level pairs the nodes of the level below.
/// The last node is the root; its duplicate is never an operand.
pub fn chain_pairs(dims: &ProblemDims, layout: &VarLayout) -> Vec<(usize, usize, usize)> {
    (0..dims.internal())
        .map(|j| {
            (
                chain_operand(dims, layout, 2 * j),
                chain_operand(dims, layout, 2 * j + 1),
                layout.s(j),
            )
        })
        .collect()
}

pub(crate) fn build(dims: &ProblemDims, layout: &VarLayout) -> Result<Vec<Cone>, MvieError> {
    if layout.num_vars() != dims.num_vars() {
        return Err(MvieError::defect("variables", dims.num_vars(), layout.num_vars()));
    }
    let mut cones = Vec::with_capacity(dims.num_cones());
    for (x, y, s) in chain_pairs(dims, layout) {
        trace!(x, y, s, "rotated cone");
        cones.push(Cone::RotatedQuadratic { x, y, s });
    }
    for i in 0..dims.m {
        cones.push(Cone::Quadratic {
            head: layout.g(i),
            tail: (0..dims.n).map(|j| layout.f(i, j)).collect(),
        });
    }

    let operands: usize = cones.iter().map(Cone::arity).sum();
    if cones.len() != dims.num_cones() {
        return Err(MvieError::defect("cones", dims.num_cones(), cones.len()));
    }
    if operands != dims.num_cone_operands() {
        return Err(MvieError::defect(
            "cone operands",
            dims.num_cone_operands(),
            operands,
        ));
    }
    Ok(cones)
}
