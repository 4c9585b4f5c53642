//! Error types for pipeline operations.
//!
//! Two kinds of problems show up while preparing a parcel dataset:
//! - [`PipelineError`]: structural problems that abort the run (missing key
//!   columns, an empty training partition, unreadable files).
//! - [`Anomaly`]: row-level problems that are recovered with a documented
//!   default. Every anomaly is logged when it is recorded and returned to the
//!   caller in the stage report.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal error type for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required column (primary key, target) is missing from the input.
    #[error("Schema error: required column '{column}' is missing")]
    Schema { column: String },
    /// A stratum is too small to be split into train and validation rows.
    #[error("Stratification error: stratum '{stratum}' has {count} member(s), need at least 2")]
    Stratification { stratum: String, count: usize },
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// Invalid hyperparameter or configuration value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// A column the fitted encoder expects is absent at transform time.
    #[error("Feature mismatch: column '{column}' was present at fit time but is missing")]
    FeatureMismatch { column: String },
    /// An array or column has the wrong length along one axis.
    #[error("Invalid shape: expected length {expected}, got {got}")]
    InvalidShape { expected: usize, got: usize },
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV parsing or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// JSON parsing error (ID source files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Configuration file could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
    /// Serialization or deserialization of a fitted transform failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    /// The external regression model reported a failure.
    #[error("Model error: {0}")]
    Model(String),
}

/// A recovered, row-level data-quality problem.
///
/// Anomalies never abort a stage. They are emitted to the log with
/// `tracing::warn!` by [`Anomaly::record`] and collected in stage reports.
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// Requested parcel ID is absent from the dataset (or has no coordinates).
    LookupMiss { land_id: i64 },
    /// Some values of a column failed numeric coercion and were set to null.
    CoercionWarning { column: String, failed: usize },
    /// No known-soil neighbor within the radius; the default category was used.
    ImputationGap { land_id: Option<i64> },
    /// A categorical value was not seen at fit time and mapped to a sentinel.
    UnseenCategory { column: String, value: String },
    /// An image could not be attached to a dataset row.
    AttachmentMiss { file: PathBuf, reason: String },
}

impl Anomaly {
    /// Log the anomaly without keeping it.
    pub fn emit(&self) {
        tracing::warn!(anomaly = %self, "recovered data anomaly");
    }

    /// Log the anomaly and push it onto `sink`.
    pub fn record(self, sink: &mut Vec<Anomaly>) {
        self.emit();
        sink.push(self);
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::LookupMiss { land_id } => {
                write!(f, "LookupMiss: Land_ID {} not found in the dataset", land_id)
            }
            Anomaly::CoercionWarning { column, failed } => {
                write!(
                    f,
                    "CoercionWarning: {} value(s) in column '{}' are not numeric",
                    failed, column
                )
            }
            Anomaly::ImputationGap { land_id } => match land_id {
                Some(id) => write!(f, "ImputationGap: no soil neighbor for Land_ID {}", id),
                None => write!(f, "ImputationGap: no soil neighbor for row without Land_ID"),
            },
            Anomaly::UnseenCategory { column, value } => {
                write!(f, "UnseenCategory: '{}' in column '{}'", value, column)
            }
            Anomaly::AttachmentMiss { file, reason } => {
                write!(f, "AttachmentMiss: {}: {}", file.display(), reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_schema() {
        let err = PipelineError::Schema {
            column: "Land_ID".to_string(),
        };
        assert!(err.to_string().contains("Schema error"));
        assert!(err.to_string().contains("Land_ID"));
    }

    #[test]
    fn test_error_display_stratification() {
        let err = PipelineError::Stratification {
            stratum: "goa".to_string(),
            count: 1,
        };
        assert!(err.to_string().contains("Stratification error"));
    }

    #[test]
    fn test_error_display_empty_data() {
        let err = PipelineError::EmptyData("no rows".to_string());
        assert!(err.to_string().contains("Empty data"));
    }

    #[test]
    fn test_error_display_feature_mismatch() {
        let err = PipelineError::FeatureMismatch {
            column: "State".to_string(),
        };
        assert!(err.to_string().contains("Feature mismatch"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: PipelineError = json_err.into();
        assert!(matches!(err, PipelineError::Json(_)));
    }

    #[test]
    fn test_error_from_bincode_error() {
        let bad_bytes: &[u8] = &[0xff, 0xff, 0xff, 0xff];
        let bincode_result: std::result::Result<String, bincode::Error> =
            bincode::deserialize(bad_bytes);
        if let Err(e) = bincode_result {
            let err: PipelineError = e.into();
            assert!(matches!(err, PipelineError::Serialization(_)));
        }
    }

    #[test]
    fn test_error_is_std_error() {
        let err = PipelineError::InvalidParameter("test".to_string());
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_anomaly_record_pushes() {
        let mut sink = Vec::new();
        Anomaly::LookupMiss { land_id: 7 }.record(&mut sink);
        assert_eq!(sink, vec![Anomaly::LookupMiss { land_id: 7 }]);
        assert!(sink[0].to_string().contains("Land_ID 7"));
    }
}
