//! Synthetic forensic datasets for demos, tests and benchmarking.
//!
//! Two generators, both driven by an explicit [`SecureRng`]:
//!
//! - [`FinancialDataSimulator`]: an imbalanced table of financial ratios
//!   with a fraud label, where fraudulent filings show weaker liquidity,
//!   higher leverage, smoothed margins, strong Benford deviation and more
//!   convoluted disclosure text.
//! - [`generate_benford_demo_series`]: transaction amounts mixing
//!   log-normal (Benford-like) legitimate values with uniformly invented
//!   ones.

use crate::dataset::{ClassLabel, FeatureSchema, LabeledDataset};
use crate::errors::{validate_parameter, ForensicError, ForensicResult};
use crate::secure_rng::SecureRng;
use rand::distributions::Uniform;
use rand_distr::{Exp, LogNormal, Normal};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sampling law of one simulated column.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColumnProfile {
    /// Gaussian with the given mean and standard deviation
    Normal {
        /// Mean
        mean: f64,
        /// Standard deviation
        std_dev: f64,
    },
    /// Exponential with the given scale (mean)
    Exponential {
        /// Scale, i.e. 1 / rate
        scale: f64,
    },
}

impl ColumnProfile {
    fn sample_column(&self, rng: &mut SecureRng, count: usize) -> ForensicResult<Vec<f64>> {
        match *self {
            ColumnProfile::Normal { mean, std_dev } => {
                let dist = Normal::new(mean, std_dev).map_err(|e| invalid("std_dev", std_dev, e))?;
                Ok(rng.sample_n(&dist, count))
            }
            ColumnProfile::Exponential { scale } => {
                validate_parameter(scale, f64::MIN_POSITIVE, f64::MAX, "scale")?;
                let dist = Exp::new(1.0 / scale).map_err(|e| invalid("scale", scale, e))?;
                Ok(rng.sample_n(&dist, count))
            }
        }
    }
}

fn invalid(parameter: &str, value: f64, err: impl std::fmt::Display) -> ForensicError {
    ForensicError::InvalidParameter {
        parameter: parameter.to_string(),
        value,
        constraint: err.to_string(),
    }
}

/// Column laws of the legitimate class, in default schema order.
pub const LEGITIMATE_PROFILE: [ColumnProfile; 5] = [
    ColumnProfile::Normal { mean: 1.5, std_dev: 0.3 },
    ColumnProfile::Normal { mean: 0.5, std_dev: 0.1 },
    ColumnProfile::Normal { mean: 0.10, std_dev: 0.02 },
    ColumnProfile::Exponential { scale: 0.05 },
    ColumnProfile::Normal { mean: 10.0, std_dev: 2.0 },
];

/// Column laws of the fraudulent class, in default schema order.
pub const FRAUDULENT_PROFILE: [ColumnProfile; 5] = [
    ColumnProfile::Normal { mean: 0.8, std_dev: 0.4 },
    ColumnProfile::Normal { mean: 1.2, std_dev: 0.5 },
    ColumnProfile::Normal { mean: 0.15, std_dev: 0.05 },
    ColumnProfile::Normal { mean: 0.3, std_dev: 0.1 },
    ColumnProfile::Normal { mean: 16.0, std_dev: 3.0 },
];

/// Configuration of [`FinancialDataSimulator`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulatorConfig {
    /// Total number of rows
    pub n_samples: usize,
    /// Share of fraudulent rows (floored to a whole row count)
    pub fraud_ratio: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            n_samples: 1000,
            fraud_ratio: 0.05,
        }
    }
}

/// Generator of an imbalanced financial-ratio dataset.
#[derive(Debug, Clone)]
pub struct FinancialDataSimulator {
    config: SimulatorConfig,
}

impl FinancialDataSimulator {
    /// Create a simulator.
    pub fn new(config: SimulatorConfig) -> ForensicResult<Self> {
        validate_parameter(config.fraud_ratio, 0.0, 1.0, "fraud_ratio")?;
        if config.n_samples == 0 {
            return Err(ForensicError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        Ok(Self { config })
    }

    /// Number of fraudulent rows the simulator will produce.
    pub fn n_frauds(&self) -> usize {
        (self.config.n_samples as f64 * self.config.fraud_ratio).floor() as usize
    }

    /// Generate a shuffled dataset with the default fraud schema.
    pub fn generate(&self, rng: &mut SecureRng) -> ForensicResult<LabeledDataset> {
        let n_frauds = self.n_frauds();
        let n_legit = self.config.n_samples - n_frauds;

        let mut rows = simulate_rows(&LEGITIMATE_PROFILE, n_legit, rng)?;
        rows.extend(simulate_rows(&FRAUDULENT_PROFILE, n_frauds, rng)?);
        let mut labels = vec![ClassLabel::Legitimate; n_legit];
        labels.extend(std::iter::repeat(ClassLabel::Fraudulent).take(n_frauds));

        let mut order: Vec<usize> = (0..rows.len()).collect();
        rng.shuffle(&mut order);
        let shuffled_rows = order.iter().map(|&i| rows[i].clone()).collect();
        let shuffled_labels = order.iter().map(|&i| labels[i]).collect();

        log::debug!(
            "Simulated {} rows ({} fraudulent)",
            self.config.n_samples,
            n_frauds
        );

        LabeledDataset::new(FeatureSchema::fraud_default(), shuffled_rows, shuffled_labels)
    }
}

/// Sample `count` rows column by column from a profile.
fn simulate_rows(
    profile: &[ColumnProfile],
    count: usize,
    rng: &mut SecureRng,
) -> ForensicResult<Vec<Vec<f64>>> {
    let columns = profile
        .iter()
        .map(|p| p.sample_column(rng, count))
        .collect::<ForensicResult<Vec<_>>>()?;
    Ok((0..count)
        .map(|i| columns.iter().map(|c| c[i]).collect())
        .collect())
}

/// Configuration of [`generate_benford_demo_series`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BenfordDemoConfig {
    /// Number of log-normal (legitimate) amounts
    pub n_legitimate: usize,
    /// Number of uniformly invented amounts
    pub n_fabricated: usize,
    /// Location of the underlying normal of the log-normal amounts
    pub log_mean: f64,
    /// Scale of the underlying normal of the log-normal amounts
    pub log_sigma: f64,
    /// Range of invented amounts
    pub fabricated_range: (f64, f64),
}

impl Default for BenfordDemoConfig {
    fn default() -> Self {
        Self {
            n_legitimate: 1000,
            n_fabricated: 200,
            log_mean: 10.0,
            log_sigma: 1.0,
            fabricated_range: (1000.0, 9000.0),
        }
    }
}

/// Legitimate log-normal amounts followed by uniformly invented amounts.
pub fn generate_benford_demo_series(
    config: &BenfordDemoConfig,
    rng: &mut SecureRng,
) -> ForensicResult<Vec<f64>> {
    let (low, high) = config.fabricated_range;
    if !(low.is_finite() && high.is_finite() && low < high) {
        return Err(ForensicError::InvalidParameter {
            parameter: "fabricated_range".to_string(),
            value: low,
            constraint: format!("finite low < high, got ({}, {})", low, high),
        });
    }

    let lognormal = LogNormal::new(config.log_mean, config.log_sigma)
        .map_err(|e| invalid("log_sigma", config.log_sigma, e))?;
    let uniform = Uniform::new(low, high);

    let mut series = rng.sample_n(&lognormal, config.n_legitimate);
    series.extend(rng.sample_n(&uniform, config.n_fabricated));
    Ok(series)
}
