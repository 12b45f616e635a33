use approx::assert_relative_eq;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, StandardNormal};

use super::*;
use crate::{
    dispersion::remove_quadratic_correlation,
    stats::weighted_covariance_determinant,
    tests::{PZ_CENTER, SIGMA_PX, SIGMA_X, SyntheticBeam, init_logger},
};

/// Beam matched to the given trace-space Twiss parameters and geometric
/// emittance, constant `pz`.
fn matched_beam(n: usize, alpha: f64, beta: f64, emittance: f64, seed: u64) -> SyntheticBeam {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut beam = SyntheticBeam::gaussian(n, seed, 1.0);
    for i in 0..n {
        let u1: f64 = StandardNormal.sample(&mut rng);
        let u2: f64 = StandardNormal.sample(&mut rng);
        let xp = (emittance / beta).sqrt() * (u2 - alpha * u1);
        beam.x[i] = (emittance * beta).sqrt() * u1;
        beam.py[i] = 0.0;
        beam.pz[i] = PZ_CENTER;
        beam.px[i] = xp * PZ_CENTER;
    }
    beam
}

fn dispersed(beam: &SyntheticBeam, dispersion: f64) -> Vec<f64> {
    let dev = MomentumDeviation::new(&beam.px, &beam.py, &beam.pz, Weights::from(&beam.w)).unwrap();
    beam.x
        .iter()
        .zip(&dev.dgamma)
        .map(|(x, d)| x + dispersion * d)
        .collect()
}

#[test]
fn uncorrelated_beam_has_no_alpha() {
    init_logger();
    let beam = SyntheticBeam::gaussian(20_000, 11, 1.0);
    let w = Weights::from(&beam.w);
    let expected_beta = SIGMA_X * PZ_CENTER / SIGMA_PX;

    for kind in [EmittanceKind::TraceSpace, EmittanceKind::PhaseSpace] {
        let twiss = twiss_parameters(&beam.x, &beam.px, &beam.py, &beam.pz, w, kind, false).unwrap();
        assert!(twiss.alpha.abs() < 0.05, "{kind:?}: alpha = {}", twiss.alpha);
        assert_relative_eq!(twiss.beta, expected_beta, max_relative = 0.05);
        assert_relative_eq!(
            twiss.beta * twiss.gamma - twiss.alpha * twiss.alpha,
            1.0,
            epsilon = 1e-9
        );
    }
}

#[test]
fn matched_beam_is_recovered() {
    let beam = matched_beam(40_000, -1.5, 4.0, 2e-9, 12);
    let w = Weights::from(&beam.w);

    let trace =
        twiss_parameters(&beam.x, &beam.px, &beam.py, &beam.pz, w, EmittanceKind::TraceSpace, false)
            .unwrap();
    assert_relative_eq!(trace.alpha, -1.5, max_relative = 0.05);
    assert_relative_eq!(trace.beta, 4.0, max_relative = 0.05);
    assert_relative_eq!(trace.gamma, (1.0 + 1.5 * 1.5) / 4.0, max_relative = 0.05);

    let phase =
        twiss_parameters(&beam.x, &beam.px, &beam.py, &beam.pz, w, EmittanceKind::PhaseSpace, false)
            .unwrap();
    assert_relative_eq!(phase.alpha, trace.alpha, max_relative = 1e-3);
    assert_relative_eq!(phase.beta, trace.beta, max_relative = 1e-3);
}

#[test]
fn inputs_are_not_centered_in_place() {
    let mut beam = SyntheticBeam::gaussian(1_000, 13, 5.0);
    for x in beam.x.iter_mut() {
        *x += 1e-3;
    }
    let before = beam.x.clone();
    let w = Weights::from(&beam.w);

    let first =
        twiss_parameters(&beam.x, &beam.px, &beam.py, &beam.pz, w, EmittanceKind::PhaseSpace, true)
            .unwrap();
    let second =
        twiss_parameters(&beam.x, &beam.px, &beam.py, &beam.pz, w, EmittanceKind::PhaseSpace, true)
            .unwrap();
    assert_eq!(first, second);
    assert_eq!(beam.x, before);
}

#[test]
fn dispersion_corrected_twiss_matches_clean_beam() {
    let beam = SyntheticBeam::gaussian(20_000, 14, 10.0);
    let w = Weights::from(&beam.w);
    let x_disp = dispersed(&beam, 2e-3);

    for kind in [EmittanceKind::TraceSpace, EmittanceKind::PhaseSpace] {
        let clean = twiss_parameters(&beam.x, &beam.px, &beam.py, &beam.pz, w, kind, false).unwrap();
        let dirty = twiss_parameters(&x_disp, &beam.px, &beam.py, &beam.pz, w, kind, false).unwrap();
        let corrected =
            twiss_parameters(&x_disp, &beam.px, &beam.py, &beam.pz, w, kind, true).unwrap();

        assert!(dirty.beta > 2.0 * clean.beta);
        assert_relative_eq!(corrected.beta, clean.beta, max_relative = 0.05);
    }

    let clean =
        twiss_parameters(&beam.x, &beam.px, &beam.py, &beam.pz, w, EmittanceKind::TraceSpace, false)
            .unwrap();
    let fitted = twiss_parameters_dispersion_corrected(&x_disp, &beam.px, &beam.py, &beam.pz, w).unwrap();
    assert_relative_eq!(fitted.beta, clean.beta, max_relative = 0.05);
}

#[test]
fn both_correction_paths_agree_for_uniform_weights() {
    let beam = SyntheticBeam::gaussian(5_000, 15, 10.0);
    let w = Weights::Uniform(1.0);
    let x_disp = dispersed(&beam, 1e-3);

    let flagged =
        twiss_parameters(&x_disp, &beam.px, &beam.py, &beam.pz, w, EmittanceKind::TraceSpace, true)
            .unwrap();
    let fitted = twiss_parameters_dispersion_corrected(&x_disp, &beam.px, &beam.py, &beam.pz, w).unwrap();

    assert_relative_eq!(flagged.alpha, fitted.alpha, epsilon = 1e-6);
    assert_relative_eq!(flagged.beta, fitted.beta, max_relative = 1e-6);
}

#[test]
fn phase_space_correction_leaves_px_untouched() {
    let mut beam = SyntheticBeam::gaussian(20_000, 16, 10.0);
    let injected = MomentumDeviation::new(&beam.px, &beam.py, &beam.pz, Weights::from(&beam.w))
        .unwrap()
        .dgamma;
    for i in 0..beam.len() {
        beam.x[i] += 2e-7 * beam.px[i] + 1e-3 * injected[i];
        beam.px[i] += 300.0 * injected[i];
    }
    let w = Weights::from(&beam.w);

    let twiss =
        twiss_parameters(&beam.x, &beam.px, &beam.py, &beam.pz, w, EmittanceKind::PhaseSpace, true)
            .unwrap();

    // moments with only x corrected
    let dev = MomentumDeviation::new(&beam.px, &beam.py, &beam.pz, w).unwrap();
    let gamma_avg = mean_momentum(&beam.px, &beam.py, &beam.pz, w).unwrap();
    let x_corrected =
        remove_linear_correlation(&centered(&beam.x, w).unwrap(), &dev.dgamma, w).unwrap();
    let px_centered = centered(&beam.px, w).unwrap();
    let emittance =
        phase_space_rms_emittance(&beam.x, &beam.px, &beam.py, &beam.pz, w, true).unwrap();
    let alpha = -mean_product(&x_corrected, &px_centered, w).unwrap() / emittance;
    let beta = mean_product(&x_corrected, &x_corrected, w).unwrap() * gamma_avg / emittance;

    assert_relative_eq!(twiss.alpha, alpha, max_relative = 1e-9);
    assert_relative_eq!(twiss.beta, beta, max_relative = 1e-9);
    assert!(alpha < -0.02, "alpha = {alpha}");

    // correcting px as well would shrink the emittance and change alpha
    let px_corrected = remove_linear_correlation(&px_centered, &dev.dgamma, w).unwrap();
    let x_quadratic = remove_quadratic_correlation(&beam.x, &dev.dgamma, w).unwrap();
    let emittance_both = weighted_covariance_determinant(&x_quadratic, &px_corrected, w)
        .unwrap()
        .sqrt();
    let alpha_both = -mean_product(&x_corrected, &px_corrected, w).unwrap() / emittance_both;

    assert!(emittance_both < 0.5 * emittance);
    assert!((twiss.alpha - alpha_both).abs() > 0.5 * alpha.abs());
}

#[test]
fn single_particle_has_no_twiss() {
    let w = Weights::Uniform(1.0);
    assert_eq!(
        twiss_parameters(&[1e-6], &[0.1], &[0.0], &[100.0], w, EmittanceKind::TraceSpace, false),
        Err(DiagnosticsError::DivisionByZero("emittance"))
    );
}
