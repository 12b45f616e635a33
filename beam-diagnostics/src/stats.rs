use nalgebra::{DMatrix, DVector, Matrix2};

use crate::{
    error::{DiagnosticsError, Result, check_len},
    weights::Weights,
};

fn check_not_empty(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(DiagnosticsError::DegenerateInput {
            required: 1,
            found: 0,
        });
    }
    Ok(())
}

pub fn weighted_mean(values: &[f64], weights: Weights) -> Result<f64> {
    weights.check_len(values.len())?;
    check_not_empty(values)?;

    let (sum_w, sum_wv) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum_w, sum_wv), (i, v)| {
            let w = weights.get(i);
            (sum_w + w, sum_wv + w * v)
        });
    if sum_w == 0.0 {
        return Err(DiagnosticsError::ZeroTotalWeight);
    }
    Ok(sum_wv / sum_w)
}

/// Population (biased) weighted standard deviation.
pub fn weighted_std(values: &[f64], weights: Weights) -> Result<f64> {
    let mean = weighted_mean(values, weights)?;
    let squared_deviation: Vec<f64> = values.iter().map(|v| (v - mean) * (v - mean)).collect();
    Ok(weighted_mean(&squared_deviation, weights)?.sqrt())
}

/// 2x2 covariance matrix of `a` and `b` using `|w|` as reliability weights.
///
/// Normalised by `V1 - V2 / V1` (`V1 = sum |w|`, `V2 = sum w^2`), which is
/// `N - 1` for uniform weights.
pub fn weighted_covariance(a: &[f64], b: &[f64], weights: Weights) -> Result<Matrix2<f64>> {
    let n = a.len();
    check_len("b", b, n)?;
    weights.check_len(n)?;
    if n < 2 {
        return Err(DiagnosticsError::DegenerateInput {
            required: 2,
            found: n,
        });
    }

    let mut v1 = 0.0;
    let mut v2 = 0.0;
    let mut sum_a = 0.0;
    let mut sum_b = 0.0;
    for i in 0..n {
        let w = weights.get(i).abs();
        v1 += w;
        v2 += w * w;
        sum_a += w * a[i];
        sum_b += w * b[i];
    }
    if v1 == 0.0 {
        return Err(DiagnosticsError::ZeroTotalWeight);
    }
    let mean_a = sum_a / v1;
    let mean_b = sum_b / v1;

    let norm = v1 - v2 / v1;
    if norm <= 0.0 {
        return Err(DiagnosticsError::DivisionByZero(
            "covariance normalisation (a single particle carries all the weight)",
        ));
    }

    let mut c_aa = 0.0;
    let mut c_ab = 0.0;
    let mut c_bb = 0.0;
    for i in 0..n {
        let w = weights.get(i).abs();
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        c_aa += w * da * da;
        c_ab += w * da * db;
        c_bb += w * db * db;
    }

    Ok(Matrix2::new(c_aa, c_ab, c_ab, c_bb) / norm)
}

pub fn weighted_covariance_determinant(a: &[f64], b: &[f64], weights: Weights) -> Result<f64> {
    Ok(weighted_covariance(a, b, weights)?.determinant())
}

/// Slope of the weighted regression `y = slope * x + c`.
pub fn correlation_slope(y: &[f64], x: &[f64], weights: Weights) -> Result<f64> {
    check_len("y", y, x.len())?;
    let mean_x = weighted_mean(x, weights)?;
    let mean_y = weighted_mean(y, weights)?;

    let dx: Vec<f64> = x.iter().map(|v| v - mean_x).collect();
    let cross: Vec<f64> = dx.iter().zip(y).map(|(dx, y)| dx * (y - mean_y)).collect();
    let square: Vec<f64> = dx.iter().map(|dx| dx * dx).collect();

    let var_x = weighted_mean(&square, weights)?;
    if var_x == 0.0 {
        return Err(DiagnosticsError::DivisionByZero(
            "weighted variance of the regressor",
        ));
    }
    Ok(weighted_mean(&cross, weights)? / var_x)
}

/// Least-squares polynomial fit of `y` against `x`, coefficients highest
/// degree first.
///
/// Weights multiply the residuals (not the squared residuals), so a weight of
/// `1 / sigma` is what a gaussian uncertainty `sigma` maps to. `None` fits
/// unweighted.
pub fn weighted_polyfit(
    x: &[f64],
    y: &[f64],
    degree: usize,
    weights: Option<Weights>,
) -> Result<Vec<f64>> {
    let n = x.len();
    check_len("y", y, n)?;
    let weights = weights.unwrap_or_default();
    weights.check_len(n)?;

    let order = degree + 1;
    if n < order {
        return Err(DiagnosticsError::DegenerateInput {
            required: order,
            found: n,
        });
    }
    if weights.all_zero(n) {
        return Err(DiagnosticsError::ZeroTotalWeight);
    }

    let vandermonde = |i: usize, j: usize| weights.get(i) * x[i].powi((degree - j) as i32);

    // scale columns to unit norm to keep the conditioning independent of the
    // magnitude of x
    let scale: Vec<f64> = (0..order)
        .map(|j| {
            let norm = (0..n).map(|i| vandermonde(i, j).powi(2)).sum::<f64>().sqrt();
            if norm == 0.0 { 1.0 } else { norm }
        })
        .collect();

    let lhs = DMatrix::<f64>::from_fn(n, order, |i, j| vandermonde(i, j) / scale[j]);
    let rhs = DVector::<f64>::from_fn(n, |i, _| weights.get(i) * y[i]);

    let svd = lhs.svd(true, true);
    let rcond = n as f64 * f64::EPSILON;
    let eps = rcond * svd.singular_values.max();
    let solution = svd
        .solve(&rhs, eps)
        .map_err(|_| DiagnosticsError::DivisionByZero("least squares solve"))?;

    let coefficients: Vec<f64> = solution
        .iter()
        .zip(scale.iter())
        .map(|(c, s)| c / s)
        .collect();
    log_trace!("degree {} fit of {} points: {:?}", degree, n, coefficients);
    Ok(coefficients)
}
