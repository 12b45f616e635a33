//! Per-particle quantities derived from the normalised momenta (units of
//! beta * gamma).

use crate::{
    error::{DiagnosticsError, Result, check_len},
    stats::weighted_mean,
    weights::Weights,
};

pub(crate) fn check_momenta(px: &[f64], py: &[f64], pz: &[f64], n: usize) -> Result<()> {
    check_len("px", px, n)?;
    check_len("py", py, n)?;
    check_len("pz", pz, n)
}

/// `sqrt(px^2 + py^2 + pz^2)`
pub fn momentum_magnitude(px: &[f64], py: &[f64], pz: &[f64]) -> Result<Vec<f64>> {
    check_momenta(px, py, pz, px.len())?;
    Ok(px
        .iter()
        .zip(py)
        .zip(pz)
        .map(|((px, py), pz)| (px * px + py * py + pz * pz).sqrt())
        .collect())
}

/// `sqrt(1 + px^2 + py^2 + pz^2)`, the Lorentz factor including rest energy.
pub fn total_energy(px: &[f64], py: &[f64], pz: &[f64]) -> Result<Vec<f64>> {
    check_momenta(px, py, pz, px.len())?;
    Ok(px
        .iter()
        .zip(py)
        .zip(pz)
        .map(|((px, py), pz)| (1.0 + px * px + py * py + pz * pz).sqrt())
        .collect())
}

/// Weighted mean of [`momentum_magnitude`].
pub fn mean_momentum(px: &[f64], py: &[f64], pz: &[f64], w: Weights) -> Result<f64> {
    weighted_mean(&momentum_magnitude(px, py, pz)?, w)
}

/// Trace-space angle `xp = px / pz`.
pub fn trace_space_slopes(px: &[f64], pz: &[f64]) -> Result<Vec<f64>> {
    check_len("pz", pz, px.len())?;
    px.iter()
        .zip(pz)
        .enumerate()
        .map(|(index, (px, pz))| {
            if *pz == 0.0 {
                Err(DiagnosticsError::ZeroLongitudinalMomentum { index })
            } else {
                Ok(px / pz)
            }
        })
        .collect()
}
