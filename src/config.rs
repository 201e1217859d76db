//! # Pipeline Configuration
//!
//! Configuration structures for the synthetic oversampler, the reference
//! logistic risk model and the end-to-end fraud detector, with named
//! presets in the same spirit for each.

use crate::errors::{validate_parameter, ForensicError, ForensicResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default neighborhood size of the oversampler.
pub const DEFAULT_K_NEIGHBORS: usize = 5;

/// Configuration of the synthetic minority oversampler.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmoteConfig {
    /// Number of nearest minority neighbors to interpolate towards
    pub k_neighbors: usize,
}

impl Default for SmoteConfig {
    fn default() -> Self {
        Self {
            k_neighbors: DEFAULT_K_NEIGHBORS,
        }
    }
}

impl SmoteConfig {
    /// Configuration with a specific neighborhood size.
    pub fn with_k_neighbors(k_neighbors: usize) -> Self {
        Self { k_neighbors }
    }

    /// Check that the neighborhood size is usable.
    pub fn validate(&self) -> ForensicResult<()> {
        if self.k_neighbors == 0 {
            return Err(ForensicError::InvalidParameter {
                parameter: "k_neighbors".to_string(),
                value: 0.0,
                constraint: ">= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration of the logistic regression risk model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogisticConfig {
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Maximum number of full-batch iterations
    pub max_iterations: usize,
    /// L2 penalty on the weights (not the intercept)
    pub l2_penalty: f64,
    /// Stop once the largest gradient component falls below this value
    pub convergence_tolerance: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iterations: 2_000,
            l2_penalty: 1e-3,
            convergence_tolerance: 1e-6,
        }
    }
}

impl LogisticConfig {
    /// Validate all numeric settings.
    pub fn validate(&self) -> ForensicResult<()> {
        validate_parameter(self.learning_rate, 1e-9, 10.0, "learning_rate")?;
        validate_parameter(self.l2_penalty, 0.0, 1e6, "l2_penalty")?;
        validate_parameter(self.convergence_tolerance, 0.0, 1.0, "convergence_tolerance")?;
        if self.max_iterations == 0 {
            return Err(ForensicError::InvalidParameter {
                parameter: "max_iterations".to_string(),
                value: 0.0,
                constraint: ">= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration of the end-to-end fraud detector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorConfig {
    /// Oversampler settings (applied to the training split only)
    pub smote: SmoteConfig,
    /// Share of rows held out for evaluation
    pub test_fraction: f64,
    /// Probability at or above which a record is classified as fraudulent
    pub decision_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl DetectorConfig {
    /// Standard configuration: k = 5, 30% hold-out, 0.5 threshold.
    pub fn standard() -> Self {
        Self {
            smote: SmoteConfig::default(),
            test_fraction: 0.3,
            decision_threshold: 0.5,
        }
    }

    /// Smaller neighborhood and hold-out, for small datasets and tests.
    pub fn fast() -> Self {
        Self {
            smote: SmoteConfig::with_k_neighbors(3),
            test_fraction: 0.2,
            decision_threshold: 0.5,
        }
    }

    /// Validate every nested setting.
    pub fn validate(&self) -> ForensicResult<()> {
        self.smote.validate()?;
        validate_parameter(self.test_fraction, 0.01, 0.99, "test_fraction")?;
        validate_parameter(self.decision_threshold, 0.0, 1.0, "decision_threshold")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(DetectorConfig::standard().validate().is_ok());
        assert!(DetectorConfig::fast().validate().is_ok());
        assert!(LogisticConfig::default().validate().is_ok());
        assert_eq!(DetectorConfig::default(), DetectorConfig::standard());
        assert_eq!(SmoteConfig::default().k_neighbors, 5);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        assert!(SmoteConfig::with_k_neighbors(0).validate().is_err());

        let config = DetectorConfig {
            test_fraction: 1.5,
            ..DetectorConfig::standard()
        };
        assert!(config.validate().is_err());

        let config = LogisticConfig {
            max_iterations: 0,
            ..LogisticConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LogisticConfig {
            learning_rate: f64::NAN,
            ..LogisticConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
