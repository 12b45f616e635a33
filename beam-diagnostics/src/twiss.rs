use serde::{Deserialize, Serialize};

use crate::{
    dispersion::{MomentumDeviation, remove_linear_correlation},
    emittance::{EmittanceKind, phase_space_rms_emittance, trace_space_rms_emittance},
    error::{DiagnosticsError, Result},
    kinematics::{mean_momentum, trace_space_slopes},
    stats::{weighted_mean, weighted_polyfit},
    weights::Weights,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwissParameters {
    pub alpha: f64,
    /// m
    pub beta: f64,
    /// 1/m
    pub gamma: f64,
}

impl TwissParameters {
    fn from_moments(mean_square: f64, mean_cross: f64, emittance: f64) -> Result<Self> {
        if emittance == 0.0 {
            return Err(DiagnosticsError::DivisionByZero("emittance"));
        }
        let beta = mean_square / emittance;
        let alpha = -mean_cross / emittance;
        if beta == 0.0 {
            return Err(DiagnosticsError::DivisionByZero("beta function"));
        }
        Ok(Self {
            alpha,
            beta,
            gamma: (1.0 + alpha * alpha) / beta,
        })
    }
}

fn centered(values: &[f64], w: Weights) -> Result<Vec<f64>> {
    let mean = weighted_mean(values, w)?;
    Ok(values.iter().map(|v| v - mean).collect())
}

fn mean_product(a: &[f64], b: &[f64], w: Weights) -> Result<f64> {
    let product: Vec<f64> = a.iter().zip(b).map(|(a, b)| a * b).collect();
    weighted_mean(&product, w)
}

/// Twiss parameters of the `x` plane from the emittance of type `kind`.
///
/// With `disp_corrected`, the phase-space branch removes the linear
/// `x`-momentum correlation from `x` only, while the trace-space branch
/// removes it from both `x` and `xp`.
pub fn twiss_parameters(
    x: &[f64],
    px: &[f64],
    py: &[f64],
    pz: &[f64],
    w: Weights,
    kind: EmittanceKind,
    disp_corrected: bool,
) -> Result<TwissParameters> {
    match kind {
        EmittanceKind::PhaseSpace => {
            let emittance = phase_space_rms_emittance(x, px, py, pz, w, disp_corrected)?;
            let gamma_avg = mean_momentum(px, py, pz, w)?;

            let mut x_centered = centered(x, w)?;
            let px_centered = centered(px, w)?;
            if disp_corrected {
                let dev = MomentumDeviation::new(px, py, pz, w)?;
                x_centered = remove_linear_correlation(&x_centered, &dev.dgamma, w)?;
            }

            TwissParameters::from_moments(
                mean_product(&x_centered, &x_centered, w)? * gamma_avg,
                mean_product(&x_centered, &px_centered, w)?,
                emittance,
            )
        }
        EmittanceKind::TraceSpace => {
            let emittance = trace_space_rms_emittance(x, px, py, pz, w, disp_corrected)?;

            let mut x = centered(x, w)?;
            let mut xp = centered(&trace_space_slopes(px, pz)?, w)?;
            if disp_corrected {
                let dev = MomentumDeviation::new(px, py, pz, w)?;
                x = remove_linear_correlation(&x, &dev.dgamma, w)?;
                xp = remove_linear_correlation(&xp, &dev.dgamma, w)?;
            }

            TwissParameters::from_moments(
                mean_product(&x, &x, w)?,
                mean_product(&x, &xp, w)?,
                emittance,
            )
        }
    }
}

/// Trace-space Twiss parameters after removing the `x` and `xp` correlation
/// with the momentum deviation through first-order polynomial fits.
///
/// Unlike `twiss_parameters(.., disp_corrected = true)` the emittance itself is
/// then evaluated on the corrected coordinates without any further correction.
pub fn twiss_parameters_dispersion_corrected(
    x: &[f64],
    px: &[f64],
    py: &[f64],
    pz: &[f64],
    w: Weights,
) -> Result<TwissParameters> {
    let dev = MomentumDeviation::new(px, py, pz, w)?;

    let slope = weighted_polyfit(&dev.dgamma, x, 1, Some(w))?[0];
    let x: Vec<f64> = x
        .iter()
        .zip(&dev.dgamma)
        .map(|(x, d)| x - slope * d)
        .collect();

    let xp = trace_space_slopes(px, pz)?;
    let slope = weighted_polyfit(&dev.dgamma, &xp, 1, Some(w))?[0];
    let px: Vec<f64> = xp
        .iter()
        .zip(&dev.dgamma)
        .zip(pz)
        .map(|((xp, d), pz)| (xp - slope * d) * pz)
        .collect();

    twiss_parameters(&x, &px, py, pz, w, EmittanceKind::TraceSpace, false)
}

#[cfg(test)]
mod tests;
