use serde::{Deserialize, Serialize};

use crate::error::{DiagnosticsError, Result};

/// Statistical weight of each particle, either one value broadcast to the
/// whole ensemble or one value per particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weights<'a> {
    Uniform(f64),
    PerParticle(&'a [f64]),
}

impl<'a> Weights<'a> {
    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        match self {
            Self::Uniform(w) => *w,
            Self::PerParticle(w) => w[i],
        }
    }

    /// Uniform weights fit any particle count.
    pub fn check_len(&self, expected: usize) -> Result<()> {
        match self {
            Self::Uniform(_) => Ok(()),
            Self::PerParticle(w) if w.len() == expected => Ok(()),
            Self::PerParticle(w) => Err(DiagnosticsError::ShapeMismatch {
                name: "w",
                expected,
                found: w.len(),
            }),
        }
    }

    pub fn all_zero(&self, n: usize) -> bool {
        (0..n).all(|i| self.get(i) == 0.0)
    }

    /// Weights of the particles at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> WeightsBuf {
        match self {
            Self::Uniform(w) => WeightsBuf::Uniform(*w),
            Self::PerParticle(w) => WeightsBuf::PerParticle(indices.iter().map(|&i| w[i]).collect()),
        }
    }
}

impl Default for Weights<'_> {
    fn default() -> Self {
        Self::Uniform(1.0)
    }
}

impl From<f64> for Weights<'_> {
    fn from(w: f64) -> Self {
        Self::Uniform(w)
    }
}

impl<'a> From<&'a [f64]> for Weights<'a> {
    fn from(w: &'a [f64]) -> Self {
        Self::PerParticle(w)
    }
}

impl<'a> From<&'a Vec<f64>> for Weights<'a> {
    fn from(w: &'a Vec<f64>) -> Self {
        Self::PerParticle(w.as_slice())
    }
}

/// Owned counterpart of [`Weights`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeightsBuf {
    Uniform(f64),
    PerParticle(Vec<f64>),
}

impl WeightsBuf {
    pub fn as_weights(&self) -> Weights<'_> {
        match self {
            Self::Uniform(w) => Weights::Uniform(*w),
            Self::PerParticle(w) => Weights::PerParticle(w),
        }
    }
}

impl Default for WeightsBuf {
    fn default() -> Self {
        Self::Uniform(1.0)
    }
}
