use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DiagnosticsError {
    #[error("not enough data: {required} points required, {found} given")]
    DegenerateInput { required: usize, found: usize },

    #[error("division by zero: {0}")]
    DivisionByZero(&'static str),

    #[error("sum of weights is zero")]
    ZeroTotalWeight,

    #[error("longitudinal momentum pz is zero at particle {index}")]
    ZeroLongitudinalMomentum { index: usize },

    #[error("array `{name}` has length {found}, expected {expected}")]
    ShapeMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("slicing produced no slices")]
    InvalidSliceCount,

    #[error("slice length must be positive and finite, got {0}")]
    InvalidSliceLength(f64),

    #[error("{requested} slices requested, at most {limit} supported")]
    TooManySlices { requested: f64, limit: usize },
}

pub type Result<T> = core::result::Result<T, DiagnosticsError>;

pub(crate) fn check_len(name: &'static str, values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(DiagnosticsError::ShapeMismatch {
            name,
            expected,
            found: values.len(),
        });
    }
    Ok(())
}
