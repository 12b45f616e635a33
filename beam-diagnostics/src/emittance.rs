use serde::{Deserialize, Serialize};

use crate::{
    dispersion::{MomentumDeviation, remove_linear_correlation, remove_quadratic_correlation},
    error::{Result, check_len},
    kinematics::{check_momenta, mean_momentum, total_energy, trace_space_slopes},
    slicing::{SliceSet, SlicedDiagnostic, gather},
    stats::weighted_covariance_determinant,
    weights::Weights,
};

/// Which transverse coordinate pair an emittance is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmittanceKind {
    /// `(x, xp)` with `xp = px / pz`
    #[default]
    TraceSpace,
    /// `(x, px)`
    PhaseSpace,
}

fn rms_emittance(a: &[f64], b: &[f64], w: Weights) -> Result<f64> {
    let det = weighted_covariance_determinant(a, b, w)?;
    if det < 0.0 {
        log_warn!("negative covariance determinant {} clamped to zero", det);
        return Ok(0.0);
    }
    Ok(det.sqrt())
}

fn check_plane(x: &[f64], px: &[f64], py: &[f64], pz: &[f64], w: Weights) -> Result<()> {
    check_momenta(px, py, pz, x.len())?;
    w.check_len(x.len())
}

/// Normalised RMS emittance in `(x, px)` phase space (m rad).
///
/// With `disp_corrected` the second-order `x`-momentum correlation is removed
/// first. Returns 0 for fewer than two particles, or fewer than three with
/// `disp_corrected`.
pub fn phase_space_rms_emittance(
    x: &[f64],
    px: &[f64],
    py: &[f64],
    pz: &[f64],
    w: Weights,
    disp_corrected: bool,
) -> Result<f64> {
    check_plane(x, px, py, pz, w)?;
    if x.len() < 2 || (disp_corrected && x.len() < 3) {
        // the correction fit passes through both points of a pair, which
        // leaves no spread in x
        return Ok(0.0);
    }

    if disp_corrected {
        let dev = MomentumDeviation::new(px, py, pz, w)?;
        let x = remove_quadratic_correlation(x, &dev.dgamma, w)?;
        rms_emittance(&x, px, w)
    } else {
        rms_emittance(x, px, w)
    }
}

/// RMS emittance in `(x, xp)` trace space (m rad).
///
/// With `disp_corrected` the linear correlation of both `x` and `xp` with the
/// momentum deviation is removed first. Returns 0 for fewer than two
/// particles, or fewer than three with `disp_corrected`.
pub fn trace_space_rms_emittance(
    x: &[f64],
    px: &[f64],
    py: &[f64],
    pz: &[f64],
    w: Weights,
    disp_corrected: bool,
) -> Result<f64> {
    check_plane(x, px, py, pz, w)?;
    if x.len() < 2 || (disp_corrected && x.len() < 3) {
        // the correction fit passes through both points of a pair, which
        // leaves no spread in x
        return Ok(0.0);
    }

    let xp = trace_space_slopes(px, pz)?;
    if disp_corrected {
        let dev = MomentumDeviation::new(px, py, pz, w)?;
        let x = remove_linear_correlation(x, &dev.dgamma, w)?;
        let xp = remove_linear_correlation(&xp, &dev.dgamma, w)?;
        rms_emittance(&x, &xp, w)
    } else {
        rms_emittance(x, &xp, w)
    }
}

pub fn geometric_emittance(
    x: &[f64],
    px: &[f64],
    py: &[f64],
    pz: &[f64],
    w: Weights,
    disp_corrected: bool,
) -> Result<f64> {
    let emittance = phase_space_rms_emittance(x, px, py, pz, w, disp_corrected)?;
    Ok(emittance / mean_momentum(px, py, pz, w)?)
}

pub fn normalized_trace_space_emittance(
    x: &[f64],
    px: &[f64],
    py: &[f64],
    pz: &[f64],
    w: Weights,
    disp_corrected: bool,
) -> Result<f64> {
    let emittance = trace_space_rms_emittance(x, px, py, pz, w, disp_corrected)?;
    Ok(emittance * mean_momentum(px, py, pz, w)?)
}

/// RMS emittance in `(z, energy)` (m), energy being the Lorentz factor.
pub fn longitudinal_rms_emittance(
    z: &[f64],
    px: &[f64],
    py: &[f64],
    pz: &[f64],
    w: Weights,
) -> Result<f64> {
    check_plane(z, px, py, pz, w)?;
    if z.len() < 2 {
        return Ok(0.0);
    }
    rms_emittance(z, &total_energy(px, py, pz)?, w)
}

/// Transverse emittance of every slice of `slices`.
#[allow(clippy::too_many_arguments)]
pub fn slice_emittance(
    slices: &SliceSet,
    x: &[f64],
    px: &[f64],
    py: &[f64],
    pz: &[f64],
    w: Weights,
    kind: EmittanceKind,
    disp_corrected: bool,
) -> Result<SlicedDiagnostic> {
    check_len("x", x, slices.n_particles())?;
    check_plane(x, px, py, pz, w)?;

    slices.map_slices(w, |indices| {
        let x = gather(x, indices);
        let px = gather(px, indices);
        let py = gather(py, indices);
        let pz = gather(pz, indices);
        let w = w.select(indices);
        match kind {
            EmittanceKind::PhaseSpace => {
                phase_space_rms_emittance(&x, &px, &py, &pz, w.as_weights(), disp_corrected)
            }
            EmittanceKind::TraceSpace => {
                trace_space_rms_emittance(&x, &px, &py, &pz, w.as_weights(), disp_corrected)
            }
        }
    })
}
