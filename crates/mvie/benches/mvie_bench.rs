//! Criterion benches for the inner-ellipsoid pipeline.
//!
//! - compile: program construction only (rows, triplets, cones) for n = 2..6.
//! - solve: full round trip through the Clarabel backend for n = 2, 3.
//!
//! Results live under `target/criterion`.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mvie::random::{SymmetricHalfspaceGenerator, SymmetricHalfspaceParams};
use mvie::{compile, inner_ellipsoid, ClarabelSolver, FormulationCfg, Polytope};

fn sample(dim: usize, directions: usize, seed: u64) -> Polytope {
    let params = SymmetricHalfspaceParams::isotropic(dim, directions);
    SymmetricHalfspaceGenerator::generate_single(&params, seed).unwrap()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    for dim in 2..=6 {
        let poly = sample(dim, 2 * dim, 17);
        group.bench_function(BenchmarkId::new("compile", dim), |b| {
            b.iter(|| compile(&poly, FormulationCfg::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);
    let solver = ClarabelSolver::default();
    for dim in [2usize, 3] {
        let poly = sample(dim, dim + 2, 123);
        group.bench_function(BenchmarkId::new("inner_ellipsoid", dim), |b| {
            b.iter(|| inner_ellipsoid(&poly, &solver).unwrap())
        });
    }
    group.bench_function(BenchmarkId::new("inner_ellipsoid", "unit_square"), |b| {
        let square = Polytope::unit_box(2).unwrap();
        b.iter(|| inner_ellipsoid(&square, &solver).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_compile, bench_solve);
criterion_main!(benches);
