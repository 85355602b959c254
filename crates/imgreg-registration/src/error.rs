//! Error types for registration operations.

use imgreg_core::transform::TransformError;
use thiserror::Error;

/// Recoverable metric evaluation error.
///
/// Surfaced to the registration driver, which terminates the run as
/// failed instead of crashing or substituting a default metric value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricError {
    /// The valid-sample count reached zero, either because the random
    /// draw produced no samples or because every sample mapped outside
    /// the moving image's support.
    #[error("empty sample set: no valid samples available for metric evaluation")]
    EmptySampleSet,
}

/// Error kinds reported by the registration driver.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Bound components disagree on dimensionality or parameter counts.
    /// Fatal, reported before any iteration.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A metric evaluation failed during the run.
    #[error(transparent)]
    Metric(#[from] MetricError),

    /// A parameter vector of the wrong length was supplied. Fatal,
    /// rejected immediately.
    #[error(transparent)]
    InvalidParameterVector(#[from] TransformError),

    /// The driver configuration is inconsistent (empty level schedule,
    /// zero shrink factor, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// A failed registration run: the error kind plus the iteration at
/// which it occurred.
///
/// Reaching the iteration cap is *not* a failure; it is a normal stop
/// condition reported through the registration result.
#[derive(Error, Debug)]
#[error("registration failed at iteration {iteration}: {error}")]
pub struct RegistrationFailure {
    #[source]
    pub error: RegistrationError,
    pub iteration: usize,
}

/// Result type for registration runs.
pub type Result<T> = std::result::Result<T, RegistrationFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_error_display() {
        let err = MetricError::EmptySampleSet;
        assert!(err.to_string().contains("empty sample set"));
    }

    #[test]
    fn test_failure_reports_iteration() {
        let failure = RegistrationFailure {
            error: RegistrationError::Metric(MetricError::EmptySampleSet),
            iteration: 17,
        };
        let text = failure.to_string();
        assert!(text.contains("iteration 17"));
        assert!(text.contains("empty sample set"));
    }

    #[test]
    fn test_transform_error_converts() {
        let err: RegistrationError = TransformError::InvalidParameterVector {
            expected: 2,
            actual: 3,
        }
        .into();
        assert!(matches!(err, RegistrationError::InvalidParameterVector(_)));
    }
}
