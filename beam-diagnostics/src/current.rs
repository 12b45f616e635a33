use serde::{Deserialize, Serialize};

use crate::{
    error::{DiagnosticsError, Result, check_len},
    slicing::{SliceSet, Slicing},
};

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentProfile {
    /// A, one value per slice
    pub current: Vec<f64>,
    pub edges: Vec<f64>,
    /// m
    pub slice_length: f64,
}

impl CurrentProfile {
    /// Time a slice takes to pass a fixed point at `speed_of_light` (s).
    pub fn slice_duration(&self, speed_of_light: f64) -> f64 {
        self.slice_length / speed_of_light
    }

    pub fn peak_current(&self) -> f64 {
        self.current.iter().cloned().fold(0.0, f64::max)
    }
}

/// Histograms the charge `q` (C) along `z` (m) and converts every slice's
/// charge into a current.
pub fn current_profile(
    z: &[f64],
    q: &[f64],
    slicing: Slicing,
    speed_of_light: f64,
) -> Result<CurrentProfile> {
    check_len("q", q, z.len())?;
    if speed_of_light == 0.0 {
        return Err(DiagnosticsError::DivisionByZero("speed of light"));
    }

    let slices = SliceSet::new(z, slicing)?;
    let slice_length = slices.slice_length();
    if slice_length == 0.0 {
        return Err(DiagnosticsError::DivisionByZero("slice length of a zero-length bunch"));
    }
    let slice_duration = slice_length / speed_of_light;

    let current = (0..slices.n_slices())
        .map(|k| slices.members(k).iter().map(|&i| q[i]).sum::<f64>() / slice_duration)
        .collect();

    Ok(CurrentProfile {
        current,
        edges: slices.edges().to_vec(),
        slice_length,
    })
}
