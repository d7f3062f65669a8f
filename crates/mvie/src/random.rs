//! Reproducible random polytopes in R^n.
//!
//! Purpose
//! - Feed tests, benches and the CLI `sample` command with bounded polytopes
//!   that contain the origin.
//!
//! Design
//! - Every sample carries the params snapshot plus a replay token (the seed).
//! - `PolytopeGenerator` exposes streaming (`generate_next`) and replay
//!   (`regenerate`) so callers can take either path.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::geometry::{Halfspace, Polytope};

/// Error type shared by all generators.
#[derive(Debug)]
pub enum GeneratorError {
    InvalidParams { reason: String },
    DegenerateSample { reason: String },
}

impl GeneratorError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }

    fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateSample {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParams { reason } => write!(f, "invalid generator params: {reason}"),
            Self::DegenerateSample { reason } => write!(f, "degenerate sample: {reason}"),
        }
    }
}

impl std::error::Error for GeneratorError {}

/// A single polytope plus replay metadata.
#[derive(Clone, Debug)]
pub struct PolytopeSample<P, R> {
    pub polytope: Polytope,
    pub params: P,
    pub replay: R,
}

/// Common trait for reproducible polytope sources.
pub trait PolytopeGenerator {
    type Params: Clone;
    type Replay: Clone;

    fn params(&self) -> &Self::Params;

    fn generate_next(
        &mut self,
    ) -> Result<Option<PolytopeSample<Self::Params, Self::Replay>>, GeneratorError>;

    fn regenerate(&self, replay: &Self::Replay) -> Result<Polytope, GeneratorError>;
}

/// Parameters for centrally symmetric random halfspaces `±u · x <= r`.
#[derive(Clone, Debug)]
pub struct SymmetricHalfspaceParams {
    pub dim: usize,
    /// Number of direction pairs; the polytope has `2 · directions` rows.
    pub directions: usize,
    pub radius_min: f64,
    pub radius_max: f64,
    /// Optional `dim × dim` map applied to each sampled direction.
    pub anisotropy: Option<DMatrix<f64>>,
}

impl SymmetricHalfspaceParams {
    /// Isotropic params with radii in `[0.5, 1.0]`.
    pub fn isotropic(dim: usize, directions: usize) -> Self {
        Self {
            dim,
            directions,
            radius_min: 0.5,
            radius_max: 1.0,
            anisotropy: None,
        }
    }

    fn validate(&self) -> Result<(), GeneratorError> {
        if self.dim == 0 {
            return Err(GeneratorError::invalid("dim must be >= 1"));
        }
        if self.directions < self.dim {
            return Err(GeneratorError::invalid(format!(
                "need at least {} directions to bound a polytope in R^{}",
                self.dim, self.dim
            )));
        }
        if !(self.radius_min.is_finite() && self.radius_max.is_finite()) {
            return Err(GeneratorError::invalid("radius bounds must be finite"));
        }
        if self.radius_min <= 0.0 {
            return Err(GeneratorError::invalid("radius_min must be > 0"));
        }
        if self.radius_min > self.radius_max {
            return Err(GeneratorError::invalid("radius_min <= radius_max required"));
        }
        if let Some(mat) = &self.anisotropy {
            if mat.shape() != (self.dim, self.dim) {
                return Err(GeneratorError::invalid("anisotropy must be dim x dim"));
            }
        }
        Ok(())
    }
}

/// Replay token storing the seed that regenerates the same halfspace sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedReplay {
    pub seed: u64,
}

/// Generator for the centrally symmetric random halfspace family.
pub struct SymmetricHalfspaceGenerator {
    params: SymmetricHalfspaceParams,
    master_rng: StdRng,
}

impl SymmetricHalfspaceGenerator {
    pub fn new(params: SymmetricHalfspaceParams, seed: u64) -> Result<Self, GeneratorError> {
        params.validate()?;
        Ok(Self {
            params,
            master_rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn generate_single(
        params: &SymmetricHalfspaceParams,
        seed: u64,
    ) -> Result<Polytope, GeneratorError> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut hs = Vec::with_capacity(params.directions * 2);
        for _ in 0..params.directions {
            let dir = sample_unit_vector(&mut rng, params.dim);
            let dir = match &params.anisotropy {
                Some(mat) => normalize_vector(mat * dir).ok_or_else(|| {
                    GeneratorError::degenerate("anisotropy map produced a zero direction")
                })?,
                None => dir,
            };
            let radius = sample_radius(&mut rng, params.radius_min, params.radius_max);
            hs.push(Halfspace::new(-&dir, radius));
            hs.push(Halfspace::new(dir, radius));
        }
        Polytope::from_halfspaces(&hs).map_err(|e| GeneratorError::degenerate(e.to_string()))
    }
}

impl PolytopeGenerator for SymmetricHalfspaceGenerator {
    type Params = SymmetricHalfspaceParams;
    type Replay = SeedReplay;

    fn params(&self) -> &Self::Params {
        &self.params
    }

    fn generate_next(
        &mut self,
    ) -> Result<Option<PolytopeSample<Self::Params, Self::Replay>>, GeneratorError> {
        let sample_seed = self.master_rng.next_u64();
        let poly = Self::generate_single(&self.params, sample_seed)?;
        Ok(Some(PolytopeSample {
            polytope: poly,
            params: self.params.clone(),
            replay: SeedReplay { seed: sample_seed },
        }))
    }

    fn regenerate(&self, replay: &Self::Replay) -> Result<Polytope, GeneratorError> {
        Self::generate_single(&self.params, replay.seed)
    }
}

fn sample_unit_vector(rng: &mut StdRng, dim: usize) -> DVector<f64> {
    loop {
        let v = DVector::from_fn(dim, |_, _| sample_component(rng));
        if let Some(normalized) = normalize_vector(v) {
            return normalized;
        }
    }
}

fn sample_component(rng: &mut StdRng) -> f64 {
    // Uniform in [-1, 1].
    let raw = rng.next_u64();
    let unit = (raw >> 11) as f64 / ((1u64 << 53) as f64);
    unit * 2.0 - 1.0
}

fn normalize_vector(v: DVector<f64>) -> Option<DVector<f64>> {
    let norm = v.norm();
    if norm < 1e-12 {
        None
    } else {
        Some(v / norm)
    }
}

fn sample_radius(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        return min;
    }
    let unit = rng.next_u64() as f64 / (u64::MAX as f64);
    min + (max - min) * unit
}
