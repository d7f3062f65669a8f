//! JSON shapes read and written by the CLI.

use anyhow::{Context, Result};
use mvie::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// `{"a": [[..], ..], "b": [..]}`, one row of `a` per half-space `a_i · x <= b_i`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PolytopeJson {
    pub a: Vec<Vec<f64>>,
    pub b: Vec<f64>,
}

impl PolytopeJson {
    pub fn from_polytope(poly: &Polytope) -> Self {
        Self {
            a: rows(poly.a()),
            b: poly.b().iter().copied().collect(),
        }
    }

    pub fn to_polytope(&self) -> Result<Polytope> {
        Ok(Polytope::from_rows(&self.a, &self.b)?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EllipsoidJson {
    pub n: usize,
    /// Row-major `C`.
    pub c: Vec<Vec<f64>>,
    pub d: Vec<f64>,
    pub objective: f64,
    pub det_volume: f64,
    pub volume: f64,
    pub status: String,
}

impl EllipsoidJson {
    pub fn from_solution(sol: &InnerEllipsoid) -> Self {
        Self {
            n: sol.ellipsoid.dim(),
            c: rows(&sol.ellipsoid.c),
            d: sol.ellipsoid.d.iter().copied().collect(),
            objective: sol.objective,
            det_volume: sol.det_volume(),
            volume: sol.volume(),
            status: sol.status.to_string(),
        }
    }
}

fn rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter().map(|r| r.iter().copied().collect()).collect()
}

pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}
