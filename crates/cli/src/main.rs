mod io;
mod provenance;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mvie::prelude::*;
use mvie::random::{SymmetricHalfspaceGenerator, SymmetricHalfspaceParams};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

use crate::io::{read_json, write_json, EllipsoidJson, PolytopeJson};
use crate::provenance::{current_git_rev, write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "mvie-cli")]
#[command(about = "Maximum-volume inscribed ellipsoids of H-polytopes")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Solve for the inscribed ellipsoid of a polytope JSON file
    Solve {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Drop the triangular coupling rows (objective bounds prod diag C only)
        #[arg(long)]
        loose_coupling: bool,
        /// Absolute and relative duality gap at which the solver stops
        #[arg(long, default_value_t = ClarabelCfg::default().tol_gap_rel)]
        tol_gap: f64,
    },
    /// Write a random centrally symmetric polytope
    Sample {
        #[arg(long)]
        dim: usize,
        #[arg(long)]
        directions: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0.5)]
        radius_min: f64,
        #[arg(long, default_value_t = 1.0)]
        radius_max: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    let res = match cmd.action {
        Action::Solve {
            input,
            out,
            loose_coupling,
            tol_gap,
        } => solve(&input, &out, !loose_coupling, tol_gap),
        Action::Sample {
            dim,
            directions,
            seed,
            radius_min,
            radius_max,
            out,
        } => {
            let params = SymmetricHalfspaceParams {
                dim,
                directions,
                radius_min,
                radius_max,
                anisotropy: None,
            };
            sample(params, seed, &out)
        }
        Action::Report => report(),
    };
    if let Err(err) = res {
        tracing::error!("{err:#}");
        let code = err
            .downcast_ref::<MvieError>()
            .map_or(1, MvieError::status_code);
        std::process::exit(code);
    }
}

fn solve(input: &Path, out: &Path, coupling: bool, tol_gap: f64) -> Result<()> {
    tracing::info!(input = %input.display(), out = %out.display(), coupling, tol_gap, "solve");
    let poly = read_json::<PolytopeJson>(input)?.to_polytope()?;
    let solver = ClarabelSolver::new(ClarabelCfg {
        tol_gap_abs: tol_gap,
        tol_gap_rel: tol_gap,
        ..ClarabelCfg::default()
    });
    let cfg = FormulationCfg {
        triangular_coupling: coupling,
    };
    let sol = inner_ellipsoid_with(&poly, &solver, cfg)
        .with_context(|| format!("inner ellipsoid of {}", input.display()))?;
    write_json(out, &EllipsoidJson::from_solution(&sol))?;
    let payload = Payload::new(
        "solve",
        json!({
            "n": poly.dim(),
            "m": poly.num_halfspaces(),
            "triangular_coupling": coupling,
            "tol_gap": tol_gap,
            "status": sol.status.to_string(),
        }),
    )
    .with_input(input.to_string_lossy());
    write_sidecar(out, payload)?;
    Ok(())
}

fn sample(params: SymmetricHalfspaceParams, seed: u64, out: &Path) -> Result<()> {
    tracing::info!(dim = params.dim, directions = params.directions, seed, "sample");
    let poly = SymmetricHalfspaceGenerator::generate_single(&params, seed)?;
    write_json(out, &PolytopeJson::from_polytope(&poly))?;
    let payload = Payload::new(
        "sample",
        json!({
            "dim": params.dim,
            "directions": params.directions,
            "radius_min": params.radius_min,
            "radius_max": params.radius_max,
            "seed": seed,
        }),
    );
    write_sidecar(out, payload)?;
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": current_git_rev(),
        "mvie_version": mvie::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::provenance_path;
    use tempfile::tempdir;

    #[test]
    fn solve_writes_ellipsoid_and_sidecar() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("square.json");
        let out = dir.path().join("nested/ellipsoid.json");
        let square = Polytope::unit_box(2).unwrap();
        write_json(&input, &PolytopeJson::from_polytope(&square)).unwrap();

        solve(&input, &out, true, ClarabelCfg::default().tol_gap_rel).unwrap();
        let e: EllipsoidJson = read_json(&out).unwrap();
        assert_eq!(e.n, 2);
        assert!((e.c[0][0] - 0.5).abs() < 1e-4 && e.c[0][1].abs() < 1e-4);
        assert!((e.d[1] - 0.5).abs() < 1e-4);
        assert!((e.volume - std::f64::consts::PI / 4.0).abs() < 1e-4);
        assert!(provenance_path(&out).exists());
    }

    #[test]
    fn sampled_polytope_round_trips_and_solves() {
        let dir = tempdir().unwrap();
        let poly_path = dir.path().join("poly.json");
        let params = SymmetricHalfspaceParams::isotropic(2, 4);
        sample(params.clone(), 5, &poly_path).unwrap();
        let read: PolytopeJson = read_json(&poly_path).unwrap();
        let expect = SymmetricHalfspaceGenerator::generate_single(&params, 5).unwrap();
        assert_eq!(read.to_polytope().unwrap(), expect);

        let out = dir.path().join("e.json");
        solve(&poly_path, &out, true, 1e-8).unwrap();
        assert!(out.exists());
    }

    #[test]
    fn solver_failures_keep_their_status_code() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.json");
        let empty = PolytopeJson {
            a: vec![vec![1.0], vec![-1.0]],
            b: vec![0.0, -1.0],
        };
        write_json(&input, &empty).unwrap();
        let out = dir.path().join("e.json");
        let err = solve(&input, &out, true, 1e-9).unwrap_err();
        let code = err.downcast_ref::<MvieError>().map(MvieError::status_code);
        assert!(matches!(code, Some(c) if c != mvie::STATUS_OK));
        assert!(!out.exists());
    }

    #[test]
    fn malformed_input_is_reported() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.json");
        std::fs::write(&input, r#"{"a": [[1.0, 0.0], [1.0]], "b": [1.0, 1.0]}"#).unwrap();
        let err = solve(&input, &dir.path().join("e.json"), true, 1e-9).unwrap_err();
        assert!(err.downcast_ref::<MvieError>().is_some());
    }
}
