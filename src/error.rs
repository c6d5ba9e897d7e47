//! Error types for the storage-tiering library.

use thiserror::Error;

/// Result type alias for tiering operations.
pub type Result<T> = std::result::Result<T, TieringError>;

/// Errors that can occur while clustering or classifying files.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TieringError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Invalid run or model configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// NaN or infinite feature value.
    #[error("non-finite feature value at row {row}, column {column}")]
    NonFiniteValue { row: usize, column: usize },

    /// Feature value outside the normalized [0, 1] range.
    #[error("feature value {value} at row {row}, column {column} is outside [0, 1]")]
    ValueOutOfRange { row: usize, column: usize, value: f64 },

    /// A category has no weight or direction for a clustered feature.
    #[error("category '{category}' has no weight or direction for feature '{feature}'")]
    MissingFeatureConfiguration { category: String, feature: String },

    /// The model has no global median for a clustered feature.
    #[error("no global median configured for feature '{feature}'")]
    MissingGlobalMedian { feature: String },

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TieringError {
    fn from(err: serde_json::Error) -> Self {
        TieringError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = TieringError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = TieringError::InvalidConfiguration("k must be positive".to_string());
        assert_eq!(err.to_string(), "invalid configuration: k must be positive");

        let err = TieringError::DimensionMismatch {
            expected: 5,
            got: 4,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 5, got 4");

        let err = TieringError::ValueOutOfRange {
            row: 2,
            column: 1,
            value: 1.5,
        };
        assert_eq!(
            err.to_string(),
            "feature value 1.5 at row 2, column 1 is outside [0, 1]"
        );

        let err = TieringError::MissingFeatureConfiguration {
            category: "Hot".to_string(),
            feature: "age_norm".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "category 'Hot' has no weight or direction for feature 'age_norm'"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = TieringError::MissingGlobalMedian {
            feature: "IOPS".to_string(),
        };
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: TieringError = parse.unwrap_err().into();
        assert!(matches!(err, TieringError::Serialization(_)));
    }
}
