//! Error types for the pricing pipeline.

use std::fmt;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PricerError>;

/// Error type covering every stage of the pipeline, from raw-field parsing
/// to model promotion.
///
/// Unseen categories and missing engineered features at inference time are
/// deliberately NOT errors; they are imputed locally (see
/// [`FittedMeanEncoder`](crate::features::FittedMeanEncoder) and
/// [`PriceEstimator`](crate::estimator::PriceEstimator)).
#[derive(Debug)]
pub enum PricerError {
    /// A raw field does not match its expected format (wrong unit suffix,
    /// non-numeric token). Aborts the transform for the whole input.
    ParseFormat {
        column: String,
        value: String,
        reason: String,
    },
    /// Observed columns diverge from the schema's declared sets.
    SchemaMismatch { split: String, detail: String },
    /// Empty data provided where non-empty was required.
    EmptyData(String),
    /// Column count diverges from what a fitted artifact was trained on.
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// A named column is absent from the frame.
    MissingColumn { column: String, operation: String },
    /// A column holds the wrong data kind for the requested operation.
    ColumnKind { column: String, expected: String },
    /// Operation requires a fitted artifact that was never fitted.
    NotFitted(String),
    /// The best model was requested before tuning ran.
    TuningPrecondition(String),
    /// The trained model did not clear the configured acceptance score.
    ModelRejected { score: f64, expected: f64 },
    /// Algorithm identifier not present in the registry.
    UnknownAlgorithm(String),
    /// Invalid hyperparameter name or value.
    InvalidParameter(String),
    /// Malformed catalog or schema configuration.
    Config(String),
    /// Serialization or deserialization error.
    Serialization(String),
    /// I/O error during artifact operations.
    Io(String),
}

impl fmt::Display for PricerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricerError::ParseFormat {
                column,
                value,
                reason,
            } => {
                write!(f, "Parse error in column '{}': {:?} ({})", column, value, reason)
            }
            PricerError::SchemaMismatch { split, detail } => {
                write!(f, "Schema mismatch in {} data: {}", split, detail)
            }
            PricerError::EmptyData(msg) => write!(f, "Empty data: {}", msg),
            PricerError::FeatureMismatch {
                expected_features,
                got_features,
            } => {
                write!(
                    f,
                    "Feature mismatch: expected {} features, got {}",
                    expected_features, got_features
                )
            }
            PricerError::MissingColumn { column, operation } => {
                write!(f, "Column '{}' not found during {}", column, operation)
            }
            PricerError::ColumnKind { column, expected } => {
                write!(f, "Column '{}' is not {}", column, expected)
            }
            PricerError::NotFitted(msg) => write!(f, "Not fitted: {}", msg),
            PricerError::TuningPrecondition(msg) => {
                write!(f, "Tuning precondition: {}", msg)
            }
            PricerError::ModelRejected { score, expected } => {
                write!(
                    f,
                    "Model rejected: test score {:.4} below expected {:.4}",
                    score, expected
                )
            }
            PricerError::UnknownAlgorithm(name) => {
                write!(f, "Unknown algorithm: '{}'", name)
            }
            PricerError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            PricerError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PricerError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            PricerError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for PricerError {}

impl From<std::io::Error> for PricerError {
    fn from(err: std::io::Error) -> Self {
        PricerError::Io(err.to_string())
    }
}

impl From<bincode::Error> for PricerError {
    fn from(err: bincode::Error) -> Self {
        PricerError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for PricerError {
    fn from(err: serde_yaml::Error) -> Self {
        PricerError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse_format() {
        let err = PricerError::ParseFormat {
            column: "Weight".to_string(),
            value: "1.86".to_string(),
            reason: "missing 'kg' suffix".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Weight"));
        assert!(msg.contains("kg"));
    }

    #[test]
    fn test_error_display_feature_mismatch() {
        let err = PricerError::FeatureMismatch {
            expected_features: 11,
            got_features: 9,
        };
        assert!(err.to_string().contains("expected 11 features, got 9"));
    }

    #[test]
    fn test_error_display_model_rejected() {
        let err = PricerError::ModelRejected {
            score: 0.41,
            expected: 0.6,
        };
        assert!(err.to_string().contains("0.4100"));
        assert!(err.to_string().contains("0.6000"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PricerError = io_err.into();
        assert!(matches!(err, PricerError::Io(_)));
    }

    #[test]
    fn test_error_from_bincode_error() {
        let bad_bytes: &[u8] = &[0xff, 0xff, 0xff, 0xff];
        let result: std::result::Result<String, bincode::Error> = bincode::deserialize(bad_bytes);
        if let Err(e) = result {
            let err: PricerError = e.into();
            assert!(matches!(err, PricerError::Serialization(_)));
        }
    }

    #[test]
    fn test_error_is_std_error() {
        let err = PricerError::NotFitted("scaler".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
