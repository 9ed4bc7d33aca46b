//! Error taxonomy for the forecast core.
//!
//! Every failure of the fetch → transform → fit → align pipeline surfaces as a
//! `ForecastError`. Glue code (catalog, site, binary) wraps these in
//! `anyhow::Error` and recovers the variant with `downcast_ref` when it needs
//! to pick an exit code.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    /// Upstream returned nothing usable for the requested window.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// A price that breaks the log transform, or a malformed series.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The model could not be fitted (too few points, degenerate variance,
    /// unsupported order).
    #[error("model fit error: {0}")]
    ModelFitError(String),

    /// Strict alignment was requested and the horizon does not match the
    /// held-out window.
    #[error("forecast length {forecast} does not match test length {test}")]
    LengthMismatch { forecast: usize, test: usize },

    /// Transport failure that survived the retry budget.
    #[error("fetch failed: {0}")]
    Fetch(String),
}

impl ForecastError {
    /// Process exit code used by the binary for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            ForecastError::DataUnavailable(_) | ForecastError::Fetch(_) => 2,
            ForecastError::InvalidInput(_) => 3,
            ForecastError::ModelFitError(_) | ForecastError::LengthMismatch { .. } => 4,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ForecastError::DataUnavailable(_) => "data_unavailable",
            ForecastError::InvalidInput(_) => "invalid_input",
            ForecastError::ModelFitError(_) => "model_fit_error",
            ForecastError::LengthMismatch { .. } => "length_mismatch",
            ForecastError::Fetch(_) => "fetch",
        }
    }
}

pub type ForecastResult<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_diagnosable() {
        let err = ForecastError::LengthMismatch { forecast: 63, test: 62 };
        assert_eq!(err.to_string(), "forecast length 63 does not match test length 62");
        assert_eq!(err.kind(), "length_mismatch");
    }

    #[test]
    fn exit_codes_distinguish_classes() {
        assert_eq!(ForecastError::DataUnavailable("x".into()).exit_code(), 2);
        assert_eq!(ForecastError::InvalidInput("x".into()).exit_code(), 3);
        assert_eq!(ForecastError::ModelFitError("x".into()).exit_code(), 4);
    }
}
