//! Statistical diagnostics of charged-particle beams: emittances, Twiss
//! parameters, energy spread and chirp, slice diagnostics and current
//! profiles of a weighted macro-particle ensemble.
//!
//! Positions are in metres, momenta are normalized (`beta * gamma`) and
//! energies are in units of the rest energy.

mod fmt;

mod config;
mod current;
mod dispersion;
mod emittance;
mod energy;
mod ensemble;
mod error;
mod kinematics;
mod report;
mod size;
mod slicing;
mod stats;
mod twiss;
mod weights;

pub use config::DiagnosticsConfig;
pub use current::{CurrentProfile, SPEED_OF_LIGHT, current_profile};
pub use dispersion::{MomentumDeviation, remove_linear_correlation, remove_quadratic_correlation};
pub use emittance::{
    EmittanceKind, geometric_emittance, longitudinal_rms_emittance,
    normalized_trace_space_emittance, phase_space_rms_emittance, slice_emittance,
    trace_space_rms_emittance,
};
pub use energy::{
    longitudinal_energy_chirp, mean_energy, mean_kinetic_energy, relative_rms_energy_spread,
    relative_rms_slice_energy_spread, rms_correlated_energy_spread, rms_energy_spread,
};
pub use ensemble::{ParticleEnsemble, ParticleRecord};
pub use error::{DiagnosticsError, Result};
pub use kinematics::{mean_momentum, momentum_magnitude, total_energy, trace_space_slopes};
pub use report::{BeamReport, LongitudinalReport, PlaneReport, SliceReport};
pub use size::{rms_length, rms_size};
pub use slicing::{
    MAX_SLICES, SliceSet, SlicedDiagnostic, Slicing, assign_slices, compute_slice_edges,
};
pub use stats::{
    correlation_slope, weighted_covariance, weighted_covariance_determinant, weighted_mean,
    weighted_polyfit, weighted_std,
};
pub use twiss::{TwissParameters, twiss_parameters, twiss_parameters_dispersion_corrected};
pub use weights::{Weights, WeightsBuf};

#[cfg(test)]
mod tests;
