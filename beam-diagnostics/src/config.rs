use serde::{Deserialize, Serialize};

use crate::{current::SPEED_OF_LIGHT, emittance::EmittanceKind, slicing::Slicing};

/// Settings shared by every diagnostic of a [`BeamReport`](crate::BeamReport).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub slicing: Slicing,
    /// Remove the `x`-momentum correlation before computing emittances and
    /// Twiss parameters.
    pub dispersion_corrected: bool,
    /// Emittance the Twiss parameters are derived from.
    pub twiss_emittance: EmittanceKind,
    /// m/s
    pub speed_of_light: f64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            slicing: Slicing::default(),
            dispersion_corrected: false,
            twiss_emittance: EmittanceKind::default(),
            speed_of_light: SPEED_OF_LIGHT,
        }
    }
}
