//! Error types for scheduling and surrogate training.
//!
//! Fatal errors abort the enclosing operation (one training call or one
//! scheduling run). Out-of-range numeric values are not errors: range values
//! saturate and activations are clamped.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AirconError>;

/// The main error type for aircon operations.
#[derive(Error, Debug)]
pub enum AirconError {
    /// Invalid construction parameters (dimensionality, population size,
    /// learning parameters, config file values).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A feature, label or position vector has the wrong length.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The expected length.
        expected: usize,
        /// The supplied length.
        actual: usize,
    },

    /// A training call was given no samples.
    #[error("Training set is empty")]
    EmptyTrainingSet,

    /// Training for one sensor failed.
    #[error("Training failed for sensor '{sensor_id}': {reason}")]
    Training {
        /// The sensor whose model could not be trained.
        sensor_id: String,
        /// Why it failed.
        reason: String,
    },

    /// Evaluation needs at least one trained surrogate model.
    #[error("No surrogate models registered")]
    EmptyModelSet,

    /// A data source could not serve a request.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AirconError {
    pub fn config(msg: impl Into<String>) -> Self {
        AirconError::Configuration(msg.into())
    }

    /// Checks a vector length, returning `DimensionMismatch` when it differs.
    pub fn check_len(expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(AirconError::DimensionMismatch { expected, actual })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_len_reports_both_sides() {
        assert!(AirconError::check_len(3, 3).is_ok());
        match AirconError::check_len(8, 7) {
            Err(AirconError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 8);
                assert_eq!(actual, 7);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn display_includes_sensor_id() {
        let err = AirconError::Training {
            sensor_id: "s3".to_string(),
            reason: "no samples".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Training failed for sensor 's3': no samples"
        );
    }
}
