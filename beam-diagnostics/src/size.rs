use crate::{error::Result, stats::weighted_std, weights::Weights};

/// RMS bunch length (m).
pub fn rms_length(z: &[f64], w: Weights) -> Result<f64> {
    weighted_std(z, w)
}

/// RMS transverse beam size (m).
pub fn rms_size(x: &[f64], w: Weights) -> Result<f64> {
    weighted_std(x, w)
}
