//! Error types for the binning engine
//!
//! Provides a unified error type shared by all geobin crates.

use thiserror::Error;

/// Core error type for binning operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid bin width supplied to a range strategy
    #[error("Invalid bin width {width}: must be positive and finite")]
    InvalidBinWidth { width: f64 },

    /// Criteria sequence was empty
    #[error("Criteria must contain at least one level")]
    EmptyCriteria,

    /// A record's field value could not be classified at some level
    #[error("Cannot classify field '{field}': {reason}")]
    Classification { field: String, reason: String },

    /// The accessor does not know the requested field
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// Operation not supported in the binner's current mode
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create a classification error for a field
    pub fn classification(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Classification {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-state error
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }

    /// Validate a range bin width
    pub fn check_bin_width(width: f64) -> Result<()> {
        if width <= 0.0 || !width.is_finite() {
            return Err(Error::InvalidBinWidth { width });
        }
        Ok(())
    }

    /// True for errors raised at construction time
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::InvalidBinWidth { .. } | Error::EmptyCriteria)
    }

    /// True for errors raised while classifying a record
    pub fn is_classification(&self) -> bool {
        matches!(
            self,
            Error::Classification { .. } | Error::UnknownField(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidBinWidth { width: -2.0 };
        assert_eq!(
            err.to_string(),
            "Invalid bin width -2: must be positive and finite"
        );

        let err = Error::classification("taste", "expected a numeric value");
        assert_eq!(
            err.to_string(),
            "Cannot classify field 'taste': expected a numeric value"
        );

        let err = Error::invalid_state("bins_map requires a single-level hierarchy");
        assert_eq!(
            err.to_string(),
            "Invalid state: bins_map requires a single-level hierarchy"
        );
    }

    #[test]
    fn test_check_bin_width() {
        assert!(Error::check_bin_width(0.1).is_ok());
        assert!(Error::check_bin_width(10.0).is_ok());
        assert!(Error::check_bin_width(0.0).is_err());
        assert!(Error::check_bin_width(-1.0).is_err());
        assert!(Error::check_bin_width(f64::NAN).is_err());
        assert!(Error::check_bin_width(f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_categories() {
        assert!(Error::EmptyCriteria.is_configuration());
        assert!(Error::InvalidBinWidth { width: 0.0 }.is_configuration());
        assert!(Error::classification("f", "bad").is_classification());
        assert!(Error::UnknownField("color".into()).is_classification());
        assert!(!Error::invalid_state("nope").is_configuration());
        assert!(!Error::invalid_state("nope").is_classification());
    }
}
