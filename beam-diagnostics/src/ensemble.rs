use serde::{Deserialize, Serialize};

use crate::{
    error::{DiagnosticsError, Result, check_len},
    weights::{Weights, WeightsBuf},
};

/// One row of a particle dump: position (m), normalized momentum
/// `beta * gamma`, and optional weight and charge (C).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    #[serde(default)]
    pub w: Option<f64>,
    #[serde(default)]
    pub q: Option<f64>,
}

/// Owned particle coordinates with equal-length columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEnsemble {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub px: Vec<f64>,
    pub py: Vec<f64>,
    pub pz: Vec<f64>,
    weights: WeightsBuf,
    charge: Option<Vec<f64>>,
}

impl ParticleEnsemble {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
        px: Vec<f64>,
        py: Vec<f64>,
        pz: Vec<f64>,
        weights: WeightsBuf,
        charge: Option<Vec<f64>>,
    ) -> Result<Self> {
        let n = x.len();
        if n == 0 {
            return Err(DiagnosticsError::DegenerateInput {
                required: 1,
                found: 0,
            });
        }
        check_len("y", &y, n)?;
        check_len("z", &z, n)?;
        check_len("px", &px, n)?;
        check_len("py", &py, n)?;
        check_len("pz", &pz, n)?;
        weights.as_weights().check_len(n)?;
        if let Some(q) = &charge {
            check_len("q", q, n)?;
        }

        Ok(Self {
            x,
            y,
            z,
            px,
            py,
            pz,
            weights,
            charge,
        })
    }

    /// Builds an ensemble from rows. Weights and charges must be given either
    /// for every row or for none; rows without weights get weight 1.
    pub fn from_records(records: &[ParticleRecord]) -> Result<Self> {
        let column = |f: fn(&ParticleRecord) -> f64| records.iter().map(f).collect::<Vec<f64>>();
        let optional_column = |name: &'static str, f: fn(&ParticleRecord) -> Option<f64>| {
            let values: Vec<f64> = records.iter().filter_map(f).collect();
            match values.len() {
                0 => Ok(None),
                n if n == records.len() => Ok(Some(values)),
                found => Err(DiagnosticsError::ShapeMismatch {
                    name,
                    expected: records.len(),
                    found,
                }),
            }
        };

        let weights = match optional_column("w", |r| r.w)? {
            Some(w) => WeightsBuf::PerParticle(w),
            None => WeightsBuf::Uniform(1.0),
        };
        let charge = optional_column("q", |r| r.q)?;

        Self::new(
            column(|r| r.x),
            column(|r| r.y),
            column(|r| r.z),
            column(|r| r.px),
            column(|r| r.py),
            column(|r| r.pz),
            weights,
            charge,
        )
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn weights(&self) -> Weights<'_> {
        self.weights.as_weights()
    }

    pub fn charge(&self) -> Option<&[f64]> {
        self.charge.as_deref()
    }

    /// Total charge (C), if charges are known.
    pub fn total_charge(&self) -> Option<f64> {
        self.charge.as_ref().map(|q| q.iter().sum())
    }
}
