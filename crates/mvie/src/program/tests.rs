use super::*;
use crate::solver::{ConeKind, SolutionStatus, SolverError};
use nalgebra::{dmatrix, dvector};

fn loose() -> FormulationCfg {
    FormulationCfg {
        triangular_coupling: false,
    }
}

fn simplex(n: usize) -> Polytope {
    // x_j >= 0, Σ x_j <= 1
    let mut rows: Vec<Vec<f64>> = (0..n)
        .map(|j| {
            let mut r = vec![0.0; n];
            r[j] = -1.0;
            r
        })
        .collect();
    rows.push(vec![1.0; n]);
    let mut b = vec![0.0; n];
    b.push(1.0);
    Polytope::from_rows(&rows, &b).unwrap()
}

/// Closed-form counts without coupling rows.
fn expected_counts(n: usize, m: usize) -> (usize, usize) {
    let l = (n as f64).log2().ceil() as u32;
    let p = 1usize << l;
    let vars = 1 + n + 2 * (p - 1) + p + m * n + m;
    let rows = m * n + m + n + n + (p - n) + 1 + n * (n - 1) / 2 + (p - 1);
    (vars, rows)
}

#[test]
fn counts_match_closed_form_without_coupling() {
    for n in 1..=6 {
        let poly = simplex(n);
        let m = n + 1;
        let prog = compile(&poly, loose()).unwrap();
        let (vars, rows) = expected_counts(n, m);
        assert_eq!(prog.num_vars(), vars, "n={n}");
        assert_eq!(prog.num_rows(), rows, "n={n}");
        assert_eq!(prog.triplets.len(), m * n * n + 2 * n + n * (n - 1) / 2);
        let rotated = prog
            .cones
            .iter()
            .filter(|c| c.kind() == ConeKind::RotatedQuadratic)
            .count();
        assert_eq!(rotated, prog.dims.internal());
        assert_eq!(prog.cones.len() - rotated, m);
        assert!(prog
            .cones
            .iter()
            .filter(|c| c.kind() == ConeKind::Quadratic)
            .all(|c| c.arity() == n + 1));
    }
}

#[test]
fn coupling_adds_one_row_and_triplet_per_pair() {
    let poly = simplex(3);
    let a = compile(&poly, loose()).unwrap();
    let b = compile(&poly, FormulationCfg::default()).unwrap();
    assert_eq!(b.num_rows(), a.num_rows() + 3);
    assert_eq!(b.triplets.len(), a.triplets.len() + 3);
    assert_eq!(b.num_vars(), a.num_vars());
}

#[test]
fn layout_is_gap_free_in_group_order() {
    let dims = ProblemDims::new(3, 5, loose()).unwrap();
    let layout = VarLayout::new(&dims);
    let groups = layout.groups();
    let names: Vec<_> = groups.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, ["t", "d", "s", "s'", "z", "f", "g"]);
    let mut next = 0;
    for (name, r) in &groups {
        assert_eq!(r.start, next, "group {name}");
        next = r.end;
    }
    assert_eq!(next, layout.num_vars());
    assert_eq!(layout.num_vars(), dims.num_vars());
    assert_eq!(groups[2].1.len(), 3);
    assert_eq!(groups[4].1.len(), 4);
    assert_eq!(layout.f(1, 2), groups[5].1.start + 5);
    assert_eq!(layout.bar().order, 6);
}

#[test]
fn chain_is_a_balanced_tree() {
    let dims = ProblemDims::new(3, 4, loose()).unwrap();
    let lay = VarLayout::new(&dims);
    let pairs = chain_pairs(&dims, &lay);
    assert_eq!(
        pairs,
        vec![
            (lay.z(0), lay.z(1), lay.s(0)),
            (lay.z(2), lay.z(3), lay.s(1)),
            (lay.sprime(0), lay.sprime(1), lay.s(2)),
        ]
    );

    let dims = ProblemDims::new(5, 6, loose()).unwrap();
    let lay = VarLayout::new(&dims);
    let pairs = chain_pairs(&dims, &lay);
    assert_eq!(pairs.len(), 7);
    assert_eq!(pairs[4], (lay.sprime(0), lay.sprime(1), lay.s(4)));
    assert_eq!(pairs[6], (lay.sprime(4), lay.sprime(5), lay.s(6)));
    // each leaf and each non-root duplicate is used exactly once
    let mut used: Vec<usize> = pairs.iter().flat_map(|&(x, y, _)| [x, y]).collect();
    used.sort_unstable();
    let mut expect: Vec<usize> = (0..8).map(|j| lay.z(j)).collect();
    expect.extend((0..6).map(|j| lay.sprime(j)));
    expect.sort_unstable();
    assert_eq!(used, expect);
}

#[test]
fn root_row_scales_t() {
    for (n, scale) in [(2usize, 2f64.sqrt()), (3, 2.0), (4, 2.0), (5, 2f64.powf(1.5))] {
        let prog = compile(&simplex(n), loose()).unwrap();
        let lay = &prog.layout;
        let root = lay.s(prog.dims.internal() - 1);
        let row = prog
            .rows
            .iter()
            .find(|r| r.terms.len() == 2 && r.terms[0].0 == lay.t())
            .unwrap_or_else(|| panic!("no root row for n={n}"));
        assert!((row.terms[0].1 - scale).abs() < 1e-12);
        assert_eq!(row.terms[1], (root, -1.0));
        assert_eq!(row.rhs, 0.0);
    }
}

#[test]
fn single_dimension_ties_t_to_the_only_leaf() {
    let poly = Polytope::from_rows(&[vec![1.0], vec![-1.0]], &[2.0, 1.0]).unwrap();
    let prog = compile(&poly, FormulationCfg::default()).unwrap();
    assert_eq!(prog.dims.internal(), 0);
    assert!(prog.cones.iter().all(|c| c.kind() == ConeKind::Quadratic));
    let lay = &prog.layout;
    let last = prog.rows.last().unwrap();
    assert_eq!(last.terms, vec![(lay.t(), 1.0), (lay.z(0), -1.0)]);
}

#[test]
fn padding_leaves_follow_t() {
    let prog = compile(&simplex(3), loose()).unwrap();
    let lay = &prog.layout;
    let padding: Vec<_> = prog
        .rows
        .iter()
        .filter(|r| r.terms.iter().any(|&(v, _)| v == lay.z(3)))
        .collect();
    assert_eq!(padding.len(), 1);
    assert_eq!(padding[0].terms, vec![(lay.z(3), 1.0), (lay.t(), -1.0)]);

    let prog = compile(&simplex(4), loose()).unwrap();
    assert_eq!(prog.dims.padding(), 0);
}

#[test]
fn off_diagonal_weights_are_halved() {
    let poly = Polytope::unit_box(2).unwrap();
    let prog = compile(&poly, loose()).unwrap();
    let lay = &prog.layout;
    // containment row for (i=0, j=1): a_0 = (1, 0), so only C_10 carries weight
    let r = prog
        .rows
        .iter()
        .position(|row| row.terms == vec![(lay.f(0, 1), -1.0)])
        .unwrap();
    let mut trips: Vec<_> = prog
        .triplets
        .iter()
        .filter(|t| t.row == r)
        .map(|t| (t.k, t.l, t.value))
        .collect();
    trips.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    assert_eq!(trips, vec![(1, 0, 0.5), (1, 1, 0.0)]);

    // leaf ties: (n+j, j) halved, (n+j, n+j) kept
    let ties: Vec<_> = prog
        .triplets
        .iter()
        .filter(|t| t.k == 2)
        .map(|t| (t.k, t.l, t.value))
        .collect();
    assert!(ties.contains(&(2, 0, 0.5)));
    assert!(ties.contains(&(2, 2, 1.0)));
    assert!(prog.triplets.iter().all(|t| t.k >= t.l && t.bar_var == 0));
}

#[test]
fn offset_rows_carry_b() {
    let poly = Polytope::new(dmatrix![1.0, 2.0; -1.0, 0.0; 0.0, -1.0], dvector![3.0, 0.0, 0.0])
        .unwrap();
    let prog = compile(&poly, FormulationCfg::default()).unwrap();
    let lay = &prog.layout;
    let row = &prog.rows[prog.dims.m * prog.dims.n];
    assert_eq!(
        row.terms,
        vec![(lay.d(0), 1.0), (lay.d(1), 2.0), (lay.g(0), 1.0)]
    );
    assert_eq!(row.rhs, 3.0);
}

#[test]
fn too_few_halfspaces_is_invalid_input() {
    let poly = Polytope::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]], &[1.0, 1.0]).unwrap();
    assert!(matches!(
        compile(&poly, FormulationCfg::default()),
        Err(MvieError::InvalidInput { .. })
    ));
    assert!(ProblemDims::new(0, 3, loose()).is_err());
}

/// Records the call sequence instead of solving.
#[derive(Default)]
struct RecordingTask {
    vars: usize,
    bars: Vec<usize>,
    rows: usize,
    triplets: usize,
    cones: Vec<Cone>,
    objective: Vec<(usize, f64)>,
    sense: Option<Sense>,
    free: usize,
}

impl ConicTask for RecordingTask {
    fn append_vars(&mut self, count: usize) -> Result<(), SolverError> {
        self.vars += count;
        Ok(())
    }
    fn append_sym_matrix_var(&mut self, order: usize) -> Result<usize, SolverError> {
        self.bars.push(order);
        Ok(self.bars.len() - 1)
    }
    fn put_objective_coef(&mut self, var: usize, weight: f64) -> Result<(), SolverError> {
        self.objective.push((var, weight));
        Ok(())
    }
    fn put_var_bound(&mut self, _var: usize, bound: VarBound) -> Result<(), SolverError> {
        if bound == VarBound::Free {
            self.free += 1;
        }
        Ok(())
    }
    fn append_row(&mut self, _row: &LinearRow) -> Result<usize, SolverError> {
        self.rows += 1;
        Ok(self.rows - 1)
    }
    fn put_bar_triplets(&mut self, triplets: &[BarTriplet]) -> Result<(), SolverError> {
        self.triplets += triplets.len();
        Ok(())
    }
    fn append_cone(&mut self, cone: &Cone) -> Result<(), SolverError> {
        self.cones.push(cone.clone());
        Ok(())
    }
    fn put_sense(&mut self, sense: Sense) -> Result<(), SolverError> {
        self.sense = Some(sense);
        Ok(())
    }
    fn optimize(&mut self) -> Result<SolutionStatus, SolverError> {
        Ok(SolutionStatus::Unknown)
    }
    fn primal(&self) -> Result<Vec<f64>, SolverError> {
        Err(SolverError::NotSolved)
    }
    fn bar_primal(&self, _bar_var: usize) -> Result<Vec<f64>, SolverError> {
        Err(SolverError::NotSolved)
    }
    fn primal_objective(&self) -> Result<f64, SolverError> {
        Err(SolverError::NotSolved)
    }
}

#[test]
fn load_replays_the_whole_program() {
    let prog = compile(&simplex(3), FormulationCfg::default()).unwrap();
    let mut task = RecordingTask::default();
    prog.load(&mut task).unwrap();
    assert_eq!(task.vars, prog.num_vars());
    assert_eq!(task.free, prog.num_vars());
    assert_eq!(task.bars, vec![6]);
    assert_eq!(task.rows, prog.num_rows());
    assert_eq!(task.triplets, prog.triplets.len());
    assert_eq!(task.cones, prog.cones);
    assert_eq!(task.objective, vec![(prog.layout.t(), 1.0)]);
    assert_eq!(task.sense, Some(Sense::Maximize));
}

#[test]
fn builders_reject_dims_that_disagree_with_their_inputs() {
    let cfg = FormulationCfg::default();
    let square = Polytope::unit_box(2).unwrap();
    let dims = ProblemDims::new(2, 4, cfg).unwrap();
    let wide = ProblemDims::new(2, 5, cfg).unwrap();

    let err = constraints::build(&square, &wide, &VarLayout::new(&wide)).unwrap_err();
    assert!(matches!(
        err,
        MvieError::ConstructionDefect {
            what: "half-spaces",
            expected: 5,
            emitted: 4,
        }
    ));

    let err = constraints::build(&square, &dims, &VarLayout::new(&wide)).unwrap_err();
    assert!(matches!(
        err,
        MvieError::ConstructionDefect {
            what: "variables",
            ..
        }
    ));

    let cube = ProblemDims::new(3, 4, cfg).unwrap();
    let err = cones::build(&cube, &VarLayout::new(&dims)).unwrap_err();
    assert!(matches!(err, MvieError::ConstructionDefect { .. }));
    assert_ne!(err.status_code(), crate::STATUS_OK);

    assert!(constraints::build(&square, &dims, &VarLayout::new(&dims)).is_ok());
    assert!(cones::build(&dims, &VarLayout::new(&dims)).is_ok());
}
