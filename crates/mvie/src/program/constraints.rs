//! Equality rows and matrix-variable triplets.
//!
//! Block layout of the order-`2n` variable `X`:
//! - `X[0..n, 0..n] = C`;
//! - `X[n.., 0..n]` couples `C` to the leaves: its diagonal is `z`, and with
//!   triangular coupling its strictly lower part is zero;
//! - `X[n.., n..] = diag(z)`.
//!
//! Row order is fixed (containment, offsets, coupling diagonal, leaf diagonal,
//! padding, lower-right zeros, coupling zeros, root, duplicates). Every builder
//! returns the index of what it appended; totals are checked against
//! `ProblemDims` before anything reaches the solver.

use nalgebra::DMatrix;
use tracing::trace;

use super::dims::ProblemDims;
use super::layout::VarLayout;
use crate::error::MvieError;
use crate::geometry::Polytope;
use crate::packed::lower;
use crate::solver::{BarTriplet, LinearRow};

/// Append-only list of equality rows.
#[derive(Debug, Default)]
pub(crate) struct RowBuilder {
    rows: Vec<LinearRow>,
}

impl RowBuilder {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        Self {
            rows: Vec::with_capacity(cap),
        }
    }

    /// Append `Σ terms = rhs`; returns the new row's index.
    pub(crate) fn push(&mut self, terms: Vec<(usize, f64)>, rhs: f64) -> usize {
        self.rows.push(LinearRow::new(terms, rhs));
        self.rows.len() - 1
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn finish(self) -> Vec<LinearRow> {
        self.rows
    }
}

/// Append-only list of block triplets for one matrix variable.
///
/// Entries are given as the full symmetric weight; upper-triangle positions are
/// reflected. `finish` halves off-diagonal weights, since the solver counts
/// each of them twice.
#[derive(Debug)]
pub(crate) struct TripletBuilder {
    bar_var: usize,
    triplets: Vec<BarTriplet>,
}

impl TripletBuilder {
    pub(crate) fn with_capacity(bar_var: usize, cap: usize) -> Self {
        Self {
            bar_var,
            triplets: Vec::with_capacity(cap),
        }
    }

    /// Weight `value` on block entry `(row_k, col_l)` of row `row`; returns the
    /// triplet's index.
    pub(crate) fn push(&mut self, row: usize, row_k: usize, col_l: usize, value: f64) -> usize {
        let (k, l) = lower(row_k, col_l);
        self.triplets.push(BarTriplet {
            row,
            bar_var: self.bar_var,
            k,
            l,
            value,
        });
        self.triplets.len() - 1
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.triplets.len()
    }

    pub(crate) fn finish(mut self) -> Vec<BarTriplet> {
        for t in self.triplets.iter_mut().filter(|t| t.k != t.l) {
            t.value *= 0.5;
        }
        self.triplets
    }
}

/// Rows and triplets of the whole program.
pub(crate) fn build(
    poly: &Polytope,
    dims: &ProblemDims,
    layout: &VarLayout,
) -> Result<(Vec<LinearRow>, Vec<BarTriplet>), MvieError> {
    if poly.num_halfspaces() != dims.m {
        return Err(MvieError::defect("half-spaces", dims.m, poly.num_halfspaces()));
    }
    if poly.dim() != dims.n {
        return Err(MvieError::defect("dimension", dims.n, poly.dim()));
    }
    if layout.num_vars() != dims.num_vars() {
        return Err(MvieError::defect("variables", dims.num_vars(), layout.num_vars()));
    }
    let mut rows = RowBuilder::with_capacity(dims.num_rows());
    let mut trips = TripletBuilder::with_capacity(layout.bar().index, dims.num_triplets());

    containment_rows(poly.a(), dims, layout, &mut rows, &mut trips);
    offset_rows(poly, dims, layout, &mut rows);
    leaf_ties(dims, layout, &mut rows, &mut trips);
    padding_rows(dims, layout, &mut rows);
    lower_right_zeros(dims, &mut rows, &mut trips);
    if dims.coupling {
        coupling_zeros(dims, &mut rows, &mut trips);
    }
    root_row(dims, layout, &mut rows);
    duplicate_rows(dims, layout, &mut rows);

    if rows.len() != dims.num_rows() {
        return Err(MvieError::defect("rows", dims.num_rows(), rows.len()));
    }
    if trips.len() != dims.num_triplets() {
        return Err(MvieError::defect(
            "block triplets",
            dims.num_triplets(),
            trips.len(),
        ));
    }
    Ok((rows.finish(), trips.finish()))
}

/// `f_{i,j} - Σ_k A_ik C_jk = 0`.
fn containment_rows(
    a: &DMatrix<f64>,
    dims: &ProblemDims,
    layout: &VarLayout,
    rows: &mut RowBuilder,
    trips: &mut TripletBuilder,
) {
    for i in 0..dims.m {
        for j in 0..dims.n {
            let r = rows.push(vec![(layout.f(i, j), -1.0)], 0.0);
            for k in 0..dims.n {
                trips.push(r, j, k, a[(i, k)]);
            }
            trace!(row = r, i, j, "containment row");
        }
    }
}

/// `a_i · d + g_i = b_i`.
fn offset_rows(poly: &Polytope, dims: &ProblemDims, layout: &VarLayout, rows: &mut RowBuilder) {
    let a = poly.a();
    for i in 0..dims.m {
        let mut terms: Vec<(usize, f64)> = (0..dims.n).map(|j| (layout.d(j), a[(i, j)])).collect();
        terms.push((layout.g(i), 1.0));
        let r = rows.push(terms, poly.b()[i]);
        trace!(row = r, i, "offset row");
    }
}

/// `X[n+j, j] = z_j` then `X[n+j, n+j] = z_j`.
fn leaf_ties(
    dims: &ProblemDims,
    layout: &VarLayout,
    rows: &mut RowBuilder,
    trips: &mut TripletBuilder,
) {
    let n = dims.n;
    for j in 0..n {
        let r = rows.push(vec![(layout.z(j), -1.0)], 0.0);
        trips.push(r, n + j, j, 1.0);
    }
    for j in 0..n {
        let r = rows.push(vec![(layout.z(j), -1.0)], 0.0);
        trips.push(r, n + j, n + j, 1.0);
    }
    trace!(leaves = n, "leaf ties");
}

/// `z_j - t = 0` for leaves past `n`.
fn padding_rows(dims: &ProblemDims, layout: &VarLayout, rows: &mut RowBuilder) {
    for j in dims.n..dims.leaves() {
        let r = rows.push(vec![(layout.z(j), 1.0), (layout.t(), -1.0)], 0.0);
        trace!(row = r, leaf = j, "padding row");
    }
}

/// `X[k, l] = 0` for `n <= l < k < 2n`.
fn lower_right_zeros(dims: &ProblemDims, rows: &mut RowBuilder, trips: &mut TripletBuilder) {
    let n = dims.n;
    for l in n..2 * n {
        for k in l + 1..2 * n {
            let r = rows.push(Vec::new(), 0.0);
            trips.push(r, k, l, 1.0);
        }
    }
}

/// `X[n+j, k] = 0` for `k < j < n`: the coupling block becomes triangular.
fn coupling_zeros(dims: &ProblemDims, rows: &mut RowBuilder, trips: &mut TripletBuilder) {
    let n = dims.n;
    for j in 0..n {
        for k in 0..j {
            let r = rows.push(Vec::new(), 0.0);
            trips.push(r, n + j, k, 1.0);
        }
    }
    trace!(rows = dims.coupling_rows(), "coupling zeros");
}

/// `2^{l/2} t - s_root = 0`; a single leaf is tied to `t` directly.
fn root_row(dims: &ProblemDims, layout: &VarLayout, rows: &mut RowBuilder) {
    let root = match dims.internal() {
        0 => layout.z(0),
        k => layout.s(k - 1),
    };
    let r = rows.push(vec![(layout.t(), dims.root_scale()), (root, -1.0)], 0.0);
    trace!(row = r, scale = dims.root_scale(), "root row");
}

/// `s_j - s'_j = 0`.
fn duplicate_rows(dims: &ProblemDims, layout: &VarLayout, rows: &mut RowBuilder) {
    for j in 0..dims.internal() {
        rows.push(vec![(layout.s(j), 1.0), (layout.sprime(j), -1.0)], 0.0);
    }
}
