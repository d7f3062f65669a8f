//! Inscribed ellipsoids of a few small polytopes, printed with timings.
//!
//! Run: `cargo run -p mvie --example unit_square`.

use std::time::Instant;

use mvie::prelude::*;

fn main() {
    let cases = [
        ("unit_square", Polytope::unit_box(2).expect("unit square")),
        (
            "triangle",
            Polytope::from_rows(
                &[vec![-1.0, 0.0], vec![0.0, -1.0], vec![1.0, 1.0]],
                &[0.0, 0.0, 1.0],
            )
            .expect("triangle"),
        ),
        (
            "box_2x1x1",
            Polytope::axis_box(&[0.0, 0.0, 0.0], &[2.0, 1.0, 1.0]).expect("box"),
        ),
    ];
    let solver = ClarabelSolver::default();
    for (name, poly) in cases {
        let start = Instant::now();
        let sol = inner_ellipsoid(&poly, &solver).expect("inner ellipsoid");
        let ms = start.elapsed().as_secs_f64() * 1e3;
        println!(
            "case={name} n={} m={} status={} volume={:.6} time_ms={ms:.2}",
            poly.dim(),
            poly.num_halfspaces(),
            sol.status,
            sol.volume(),
        );
        println!("  d = {}", sol.ellipsoid.d.transpose());
        println!("  C = {}", sol.ellipsoid.c);
    }
}
