//! Error types and validation functions for forensic analysis.
//!
//! This module provides the error type shared by the Benford analyzer, the
//! synthetic oversampler and the risk models, together with the small
//! validation helpers used at every public entry point.

use thiserror::Error;

/// Error types for forensic analysis operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ForensicError {
    /// Insufficient data for the requested operation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Invalid parameter value for a configuration.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Numerical computation error (non-finite values, degenerate arithmetic).
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
    },

    /// A record or dataset does not match the expected column layout.
    #[error("Schema mismatch: expected {expected} columns, got {actual} ({context})")]
    SchemaMismatch {
        /// Number of columns the schema defines
        expected: usize,
        /// Number of columns actually supplied
        actual: usize,
        /// Where the mismatch was detected
        context: String,
    },

    /// Feature rows and labels are not parallel.
    #[error("Label mismatch: {rows} feature rows but {labels} labels")]
    LabelMismatch {
        /// Number of feature rows
        rows: usize,
        /// Number of labels
        labels: usize,
    },

    /// A risk model was asked to score before it was fitted.
    #[error("Model not fitted: {model} must be fitted before prediction")]
    ModelNotFitted {
        /// Model name
        model: String,
    },

    /// Model training failed.
    #[error("Model fitting failed: {reason}")]
    ModelFitError {
        /// Reason for failure
        reason: String,
    },
}

/// Result type for forensic analysis operations.
pub type ForensicResult<T> = Result<T, ForensicError>;

/// Validates that data has sufficient length for an operation.
///
/// # Example
/// ```rust
/// use forensic_finance::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2).is_ok());
/// assert!(validate_data_length(&data, 5).is_err());
/// ```
pub fn validate_data_length<T>(data: &[T], min_required: usize) -> ForensicResult<()> {
    if data.len() < min_required {
        Err(ForensicError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a parameter is within inclusive bounds.
///
/// # Example
/// ```rust
/// use forensic_finance::errors::validate_parameter;
///
/// assert!(validate_parameter(0.3, 0.0, 1.0, "test_fraction").is_ok());
/// assert!(validate_parameter(1.5, 0.0, 1.0, "test_fraction").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> ForensicResult<()> {
    if value.is_nan() {
        return Err(ForensicError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if min.is_nan() || max.is_nan() || min > max {
        return Err(ForensicError::NumericalError {
            reason: format!(
                "Invalid bounds for parameter {}: min={}, max={}",
                name, min, max
            ),
        });
    }

    if value < min || value > max {
        Err(ForensicError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that a value is finite and not NaN.
pub fn validate_finite(value: f64, name: &str) -> ForensicResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ForensicError::NumericalError {
            reason: format!("{} is not finite: {}", name, value),
        })
    }
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first offending value and reports its index.
///
/// # Example
/// ```rust
/// use forensic_finance::errors::validate_all_finite;
///
/// assert!(validate_all_finite(&[1.0, 2.0], "row").is_ok());
/// assert!(validate_all_finite(&[1.0, f64::NAN], "row").is_err());
/// ```
pub fn validate_all_finite(data: &[f64], name: &str) -> ForensicResult<()> {
    if let Some((i, value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(ForensicError::NumericalError {
            reason: format!(
                "{} contains non-finite value at index {}: {}",
                name, i, value
            ),
        });
    }
    Ok(())
}

/// Validates that a record has the width a schema expects.
pub fn validate_width(expected: usize, actual: usize, context: &str) -> ForensicResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ForensicError::SchemaMismatch {
            expected,
            actual,
            context: context.to_string(),
        })
    }
}
