use serde::Serialize;

use crate::{
    config::DiagnosticsConfig,
    current::{CurrentProfile, current_profile},
    emittance::{
        EmittanceKind, geometric_emittance, longitudinal_rms_emittance,
        normalized_trace_space_emittance, phase_space_rms_emittance, slice_emittance,
    },
    energy::{
        longitudinal_energy_chirp, mean_energy, relative_rms_energy_spread,
        relative_rms_slice_energy_spread, rms_correlated_energy_spread, rms_energy_spread,
    },
    ensemble::ParticleEnsemble,
    error::Result,
    size::{rms_length, rms_size},
    slicing::{SliceSet, SlicedDiagnostic},
    twiss::{TwissParameters, twiss_parameters},
    weights::Weights,
};

/// Diagnostics of one transverse plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaneReport {
    /// m rad
    pub phase_space_emittance: f64,
    /// m rad
    pub normalized_trace_space_emittance: f64,
    /// m rad
    pub geometric_emittance: f64,
    pub twiss: TwissParameters,
    /// m
    pub rms_size: f64,
}

impl PlaneReport {
    /// `u` is the plane's position, `pu` its momentum and `pv` the momentum
    /// of the other transverse plane.
    fn compute(
        u: &[f64],
        pu: &[f64],
        pv: &[f64],
        pz: &[f64],
        w: Weights,
        config: &DiagnosticsConfig,
    ) -> Result<Self> {
        let disp = config.dispersion_corrected;
        Ok(Self {
            phase_space_emittance: phase_space_rms_emittance(u, pu, pv, pz, w, disp)?,
            normalized_trace_space_emittance: normalized_trace_space_emittance(
                u, pu, pv, pz, w, disp,
            )?,
            geometric_emittance: geometric_emittance(u, pu, pv, pz, w, disp)?,
            twiss: twiss_parameters(u, pu, pv, pz, w, config.twiss_emittance, disp)?,
            rms_size: rms_size(u, w)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongitudinalReport {
    /// m
    pub rms_length: f64,
    /// m, in `(z, E)` with `E` in units of `m_e c^2`
    pub emittance: f64,
    /// units of `m_e c^2`
    pub mean_energy: f64,
    /// units of `m_e c^2`
    pub rms_energy_spread: f64,
    pub relative_rms_energy_spread: f64,
    /// 1/m
    pub energy_chirp: f64,
    /// units of `m_e c^2`
    pub rms_correlated_energy_spread: f64,
}

impl LongitudinalReport {
    fn compute(ensemble: &ParticleEnsemble) -> Result<Self> {
        let ParticleEnsemble { z, px, py, pz, .. } = ensemble;
        let w = ensemble.weights();
        Ok(Self {
            rms_length: rms_length(z, w)?,
            emittance: longitudinal_rms_emittance(z, px, py, pz, w)?,
            mean_energy: mean_energy(px, py, pz, w)?,
            rms_energy_spread: rms_energy_spread(px, py, pz, w)?,
            relative_rms_energy_spread: relative_rms_energy_spread(px, py, pz, w)?,
            energy_chirp: longitudinal_energy_chirp(z, px, py, pz, w)?,
            rms_correlated_energy_spread: rms_correlated_energy_spread(z, px, py, pz, w)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceReport {
    pub relative_energy_spread: SlicedDiagnostic,
    /// Phase-space emittance of the `x` plane.
    pub emittance_x: SlicedDiagnostic,
    /// Only present when the ensemble carries charges.
    pub current: Option<CurrentProfile>,
}

impl SliceReport {
    fn compute(ensemble: &ParticleEnsemble, config: &DiagnosticsConfig) -> Result<Self> {
        let ParticleEnsemble { x, z, px, py, pz, .. } = ensemble;
        let w = ensemble.weights();
        let slices = SliceSet::new(z, config.slicing)?;

        let current = match ensemble.charge() {
            Some(q) => Some(current_profile(z, q, config.slicing, config.speed_of_light)?),
            None => None,
        };

        Ok(Self {
            relative_energy_spread: relative_rms_slice_energy_spread(&slices, px, py, pz, w)?,
            emittance_x: slice_emittance(
                &slices,
                x,
                px,
                py,
                pz,
                w,
                EmittanceKind::PhaseSpace,
                config.dispersion_corrected,
            )?,
            current,
        })
    }
}

/// Every diagnostic of one particle ensemble.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeamReport {
    pub n_particles: usize,
    /// C
    pub total_charge: Option<f64>,
    pub x: PlaneReport,
    pub y: PlaneReport,
    pub longitudinal: LongitudinalReport,
    pub slices: SliceReport,
}

impl BeamReport {
    pub fn compute(ensemble: &ParticleEnsemble, config: &DiagnosticsConfig) -> Result<Self> {
        log_info!(
            "computing diagnostics of {} particles ({:?})",
            ensemble.len(),
            config
        );
        let ParticleEnsemble { x, y, px, py, pz, .. } = ensemble;
        let w = ensemble.weights();

        Ok(Self {
            n_particles: ensemble.len(),
            total_charge: ensemble.total_charge(),
            x: PlaneReport::compute(x, px, py, pz, w, config)?,
            y: PlaneReport::compute(y, py, px, pz, w, config)?,
            longitudinal: LongitudinalReport::compute(ensemble)?,
            slices: SliceReport::compute(ensemble, config)?,
        })
    }
}
