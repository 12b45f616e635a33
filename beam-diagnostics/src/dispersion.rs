use crate::{
    error::{DiagnosticsError, Result, check_len},
    kinematics::momentum_magnitude,
    stats::{correlation_slope, weighted_mean, weighted_polyfit},
    weights::Weights,
};

/// Fractional deviation of each particle's momentum magnitude from the
/// weighted mean.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumDeviation {
    pub gamma_avg: f64,
    pub dgamma: Vec<f64>,
}

impl MomentumDeviation {
    pub fn new(px: &[f64], py: &[f64], pz: &[f64], w: Weights) -> Result<Self> {
        let gamma = momentum_magnitude(px, py, pz)?;
        let gamma_avg = weighted_mean(&gamma, w)?;
        if gamma_avg == 0.0 {
            return Err(DiagnosticsError::DivisionByZero("mean momentum"));
        }
        let dgamma = gamma.iter().map(|g| (g - gamma_avg) / gamma_avg).collect();
        Ok(Self { gamma_avg, dgamma })
    }
}

/// `coord - slope * dgamma` where `slope` is the weighted linear regression
/// slope of `coord` against `dgamma`.
pub fn remove_linear_correlation(coord: &[f64], dgamma: &[f64], w: Weights) -> Result<Vec<f64>> {
    let slope = correlation_slope(coord, dgamma, w)?;
    log_debug!("linear dispersion slope: {}", slope);
    Ok(coord
        .iter()
        .zip(dgamma)
        .map(|(c, d)| c - slope * d)
        .collect())
}

/// `coord - linear * dgamma - quadratic * dgamma^2` from a weighted
/// second-order polynomial fit of `coord` against `dgamma`.
pub fn remove_quadratic_correlation(
    coord: &[f64],
    dgamma: &[f64],
    w: Weights,
) -> Result<Vec<f64>> {
    check_len("dgamma", dgamma, coord.len())?;
    let fit = weighted_polyfit(dgamma, coord, 2, Some(w))?;
    let (quadratic, linear) = (fit[0], fit[1]);
    log_debug!(
        "quadratic dispersion fit: linear {}, quadratic {}",
        linear,
        quadratic
    );
    Ok(coord
        .iter()
        .zip(dgamma)
        .map(|(c, d)| c - linear * d - quadratic * d * d)
        .collect())
}
