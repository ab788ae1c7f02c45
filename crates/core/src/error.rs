//! Error types for Aeolus

use thiserror::Error;

/// Main error type for Aeolus operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index out of range: {index} (valid indices are 0..={dimension})")]
    IndexOutOfRange { index: usize, dimension: usize },

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Indeterminate result: {0}")]
    Indeterminate(String),

    #[error("Point has no known target value")]
    MissingValue,

    #[error("Estimate already set: point carries a known value")]
    EstimateAlreadySet,

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error stems from the data (zero values, coincident
    /// points, empty folds) rather than from a programming mistake.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            Error::DivisionByZero(_) | Error::Indeterminate(_) | Error::MissingValue
        )
    }
}

/// Result type alias for Aeolus operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = Error::DimensionMismatch { expected: 3, actual: 2 };
        assert_eq!(e.to_string(), "Dimension mismatch: expected 3, got 2");

        let e = Error::invalid("folds", 1, "must be at least 2");
        assert_eq!(e.to_string(), "Invalid parameter: folds = 1 (must be at least 2)");
    }

    #[test]
    fn test_numerical_classification() {
        assert!(Error::DivisionByZero("y = 0".into()).is_numerical());
        assert!(Error::Indeterminate("empty fold".into()).is_numerical());
        assert!(!Error::IndexOutOfRange { index: 5, dimension: 3 }.is_numerical());
    }

    #[test]
    fn test_every_variant_is_specific() {
        let all = [
            Error::DimensionMismatch { expected: 3, actual: 2 },
            Error::IndexOutOfRange { index: 4, dimension: 3 },
            Error::DivisionByZero("y = 0".into()),
            Error::Indeterminate("empty fold".into()),
            Error::MissingValue,
            Error::EstimateAlreadySet,
            Error::invalid("k", 0, "must be at least 1"),
        ];
        for e in &all {
            // Exhaustive on purpose: a new variant must be classified here
            let numerical = match e {
                Error::DivisionByZero(_) | Error::Indeterminate(_) | Error::MissingValue => true,
                Error::DimensionMismatch { .. }
                | Error::IndexOutOfRange { .. }
                | Error::EstimateAlreadySet
                | Error::InvalidParameter { .. } => false,
            };
            assert_eq!(e.is_numerical(), numerical, "{}", e);
        }
    }
}
