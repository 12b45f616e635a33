use serde::{Deserialize, Serialize};

use crate::{
    error::{DiagnosticsError, Result},
    weights::Weights,
};

/// How the bunch is cut along z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slicing {
    /// Fixed number of slices spanning `min(z)..=max(z)`.
    Count(usize),
    /// Target slice length in metres. The slice count is
    /// `floor((max(z) - min(z)) / length)` and the actual slice length is
    /// adjusted so the slices span the whole bunch.
    Length(f64),
}

impl Default for Slicing {
    fn default() -> Self {
        Self::Count(10)
    }
}

fn min_max(z: &[f64]) -> Result<(f64, f64)> {
    if z.is_empty() {
        return Err(DiagnosticsError::DegenerateInput {
            required: 1,
            found: 0,
        });
    }
    Ok(z
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &z| {
            (min.min(z), max.max(z))
        }))
}

/// `num` evenly spaced values, both ends included.
fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    let step = (stop - start) / (num - 1) as f64;
    let mut values: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
    values[num - 1] = stop;
    values
}

/// Upper bound on the number of slices of one bunch.
pub const MAX_SLICES: usize = 1 << 20;

/// Returns the `n_slices + 1` slice edges.
pub fn compute_slice_edges(z: &[f64], slicing: Slicing) -> Result<Vec<f64>> {
    let (min_z, max_z) = min_max(z)?;
    let requested = match slicing {
        Slicing::Count(n) => n as f64,
        Slicing::Length(len) => {
            if !(len.is_finite() && len > 0.0) {
                return Err(DiagnosticsError::InvalidSliceLength(len));
            }
            ((max_z - min_z) / len).floor()
        }
    };
    if !(requested <= MAX_SLICES as f64) {
        return Err(DiagnosticsError::TooManySlices {
            requested,
            limit: MAX_SLICES,
        });
    }
    let n_slices = requested as usize;
    if n_slices == 0 {
        return Err(DiagnosticsError::InvalidSliceCount);
    }

    log_info!("slice length = {} m", (max_z - min_z) / n_slices as f64);
    Ok(linspace(min_z, max_z, n_slices + 1))
}

/// Slice index of every particle. Particle `i` is in slice `k` iff
/// `edges[k] < z[i] <= edges[k + 1]`; a particle sitting exactly on the
/// lowest edge is in no slice.
pub fn assign_slices(z: &[f64], edges: &[f64]) -> Vec<Option<usize>> {
    let n_slices = edges.len().saturating_sub(1);
    z.iter()
        .map(|&z| {
            let upper = edges.partition_point(|&edge| edge < z);
            (upper >= 1 && upper <= n_slices).then(|| upper - 1)
        })
        .collect()
}

pub(crate) fn gather(values: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&i| values[i]).collect()
}

/// A per-slice diagnostic. Empty slices hold value 0 and weight 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlicedDiagnostic {
    pub values: Vec<f64>,
    pub weights: Vec<f64>,
    pub edges: Vec<f64>,
}

/// Particles of one ensemble bucketed into longitudinal slices.
#[derive(Debug, Clone)]
pub struct SliceSet {
    edges: Vec<f64>,
    members: Vec<Vec<usize>>,
    n_particles: usize,
}

impl SliceSet {
    pub fn new(z: &[f64], slicing: Slicing) -> Result<Self> {
        let edges = compute_slice_edges(z, slicing)?;
        Ok(Self::with_edges(z, edges))
    }

    /// `edges` must be non-decreasing.
    pub fn with_edges(z: &[f64], edges: Vec<f64>) -> Self {
        let mut members = vec![Vec::new(); edges.len().saturating_sub(1)];
        for (i, slice) in assign_slices(z, &edges).into_iter().enumerate() {
            if let Some(k) = slice {
                members[k].push(i);
            }
        }
        log_debug!(
            "slice occupancy: {:?}",
            members.iter().map(Vec::len).collect::<Vec<_>>()
        );

        Self {
            edges,
            members,
            n_particles: z.len(),
        }
    }

    pub fn n_slices(&self) -> usize {
        self.members.len()
    }

    pub fn n_particles(&self) -> usize {
        self.n_particles
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn members(&self, slice: usize) -> &[usize] {
        &self.members[slice]
    }

    /// Width of every slice; all slices have the same width.
    pub fn slice_length(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    /// Sum of `w` over each slice's particles.
    pub fn slice_weights(&self, w: Weights) -> Result<Vec<f64>> {
        w.check_len(self.n_particles)?;
        Ok(self
            .members
            .iter()
            .map(|indices| indices.iter().map(|&i| w.get(i)).sum())
            .collect())
    }

    /// Evaluates `estimate` on the member indices of every non-empty slice.
    pub fn map_slices<F>(&self, w: Weights, mut estimate: F) -> Result<SlicedDiagnostic>
    where
        F: FnMut(&[usize]) -> Result<f64>,
    {
        let weights = self.slice_weights(w)?;
        let values = self
            .members
            .iter()
            .map(|indices| {
                if indices.is_empty() {
                    Ok(0.0)
                } else {
                    estimate(indices)
                }
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(SlicedDiagnostic {
            values,
            weights,
            edges: self.edges.clone(),
        })
    }
}
