//! Benford's Law first-digit conformance testing.
//!
//! Naturally occurring financial magnitudes (invoice totals, ledger
//! balances, expense claims) follow Benford's distribution of leading
//! digits, P(d) = log10(1 + 1/d). Fabricated figures tend not to. This
//! module extracts leading digits from a magnitude series and reports, per
//! digit, the observed and expected frequencies together with a
//! continuity-corrected proportion Z-test.
//!
//! # Example
//! ```rust
//! use forensic_finance::benford::BenfordAnalyzer;
//!
//! let report = BenfordAnalyzer::new(vec![123.0, 234.0, 345.0, 119.0, 150.0, 199.0]).analyze();
//! assert_eq!(report.total_count, 6);
//! assert_eq!(report.row(1).unwrap().actual_count, 4);
//! ```

use crate::errors::{validate_parameter, ForensicError, ForensicResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Expected first-digit frequencies, rounded to three decimals.
///
/// Index 0 holds digit 1. The rounded table sums to exactly 1.000 and is
/// used verbatim so that reports are reproducible across implementations.
pub const BENFORD_PROBS: [f64; 9] = [0.301, 0.176, 0.125, 0.097, 0.079, 0.067, 0.058, 0.051, 0.046];

/// Degrees of freedom of the first-digit chi-square test.
const CHI_SQUARE_DOF: f64 = 8.0;

/// Mean absolute deviation bands for first-digit conformity.
const MAD_CLOSE: f64 = 0.006;
const MAD_ACCEPTABLE: f64 = 0.012;
const MAD_MARGINAL: f64 = 0.015;

/// Extract the first significant decimal digit of a magnitude.
///
/// The sign is discarded. Returns `None` for zero, NaN and infinities.
/// Values below one skip their leading zeros, so `0.0034` yields `3`.
pub fn leading_digit(value: f64) -> Option<u8> {
    if !value.is_finite() || value == 0.0 {
        return None;
    }
    // Shortest round-trip scientific rendering: the first character is
    // always the first significant digit ("3.4e-3", "1.23e2", "5e0").
    let rendered = format!("{:e}", value.abs());
    rendered
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .filter(|d| (1..=9).contains(d))
        .map(|d| d as u8)
}

/// Exact (unrounded) Benford probability of a leading digit.
pub fn benford_probability(digit: u8) -> f64 {
    if (1..=9).contains(&digit) {
        (1.0 + 1.0 / digit as f64).log10()
    } else {
        0.0
    }
}

/// Per-digit row of a [`DigitDistributionReport`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DigitRow {
    /// Leading digit (1-9)
    pub digit: u8,
    /// Number of magnitudes starting with this digit
    pub actual_count: usize,
    /// Observed proportion
    pub actual_freq: f64,
    /// Benford proportion from [`BENFORD_PROBS`]
    pub expected_freq: f64,
    /// Benford proportion scaled by the sample size
    pub expected_count: f64,
    /// |observed - expected| proportion
    pub difference_abs: f64,
    /// Continuity-corrected proportion Z statistic
    pub z_score: f64,
}

/// Result of a chi-square goodness-of-fit test against Benford's table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChiSquareTest {
    /// Pearson chi-square statistic over the nine digits
    pub statistic: f64,
    /// Degrees of freedom (always 8)
    pub degrees_of_freedom: f64,
    /// Upper-tail p-value
    pub p_value: f64,
}

/// Conformity classification based on the mean absolute deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Conformity {
    /// MAD ≤ 0.006
    Close,
    /// 0.006 < MAD ≤ 0.012
    Acceptable,
    /// 0.012 < MAD ≤ 0.015
    Marginal,
    /// MAD > 0.015
    Nonconformity,
}

/// Digit-frequency deviation report for digits 1 through 9.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DigitDistributionReport {
    /// One row per digit, in ascending digit order
    pub rows: Vec<DigitRow>,
    /// Number of magnitudes that survived cleaning
    pub total_count: usize,
}

impl DigitDistributionReport {
    /// Row for a digit, or `None` outside 1-9.
    pub fn row(&self, digit: u8) -> Option<&DigitRow> {
        if (1..=9).contains(&digit) {
            self.rows.get(digit as usize - 1)
        } else {
            None
        }
    }

    /// Whether the report was built from an empty series.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Mean absolute deviation between observed and expected frequencies.
    ///
    /// This is the `benford_deviation` feature fed to the risk model.
    pub fn mean_absolute_deviation(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.rows.iter().map(|r| r.difference_abs).sum::<f64>() / self.rows.len() as f64
    }

    /// Conformity band of the series, `None` for an empty report.
    pub fn conformity(&self) -> Option<Conformity> {
        if self.is_empty() {
            return None;
        }
        let mad = self.mean_absolute_deviation();
        Some(if mad <= MAD_CLOSE {
            Conformity::Close
        } else if mad <= MAD_ACCEPTABLE {
            Conformity::Acceptable
        } else if mad <= MAD_MARGINAL {
            Conformity::Marginal
        } else {
            Conformity::Nonconformity
        })
    }

    /// Pearson chi-square test of the observed counts against Benford's table.
    pub fn chi_square_test(&self) -> ForensicResult<Option<ChiSquareTest>> {
        if self.is_empty() {
            return Ok(None);
        }

        let statistic: f64 = self
            .rows
            .iter()
            .map(|r| {
                let diff = r.actual_count as f64 - r.expected_count;
                diff * diff / r.expected_count
            })
            .sum();

        let distribution =
            ChiSquared::new(CHI_SQUARE_DOF).map_err(|e| ForensicError::NumericalError {
                reason: format!("chi-square distribution unavailable: {}", e),
            })?;

        Ok(Some(ChiSquareTest {
            statistic,
            degrees_of_freedom: CHI_SQUARE_DOF,
            p_value: 1.0 - distribution.cdf(statistic),
        }))
    }

    /// Digits whose Z-score exceeds the two-sided critical value at `confidence`.
    pub fn significant_digits(&self, confidence: f64) -> ForensicResult<Vec<u8>> {
        validate_parameter(confidence, 0.5, 0.999_999, "confidence")?;
        let normal = Normal::new(0.0, 1.0).map_err(|e| ForensicError::NumericalError {
            reason: format!("standard normal unavailable: {}", e),
        })?;
        let critical = normal.inverse_cdf(1.0 - (1.0 - confidence) / 2.0);

        Ok(self
            .rows
            .iter()
            .filter(|r| r.z_score > critical)
            .map(|r| r.digit)
            .collect())
    }
}

/// First-digit analyzer over a cleaned magnitude series.
#[derive(Debug, Clone)]
pub struct BenfordAnalyzer {
    digits: Vec<u8>,
}

impl BenfordAnalyzer {
    /// Build an analyzer from raw magnitudes.
    ///
    /// NaN (missing) and zero values are dropped, non-finite values are
    /// dropped with a warning, and the absolute value of the rest is used.
    pub fn new<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self::from_nullable(values.into_iter().map(Some))
    }

    /// Build an analyzer from magnitudes with explicit missing entries.
    pub fn from_nullable<I: IntoIterator<Item = Option<f64>>>(values: I) -> Self {
        let mut non_finite = 0usize;
        let digits: Vec<u8> = values
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan() && *v != 0.0)
            .filter_map(|v| {
                let digit = leading_digit(v);
                if digit.is_none() {
                    non_finite += 1;
                }
                digit
            })
            .collect();

        if non_finite > 0 {
            log::warn!("Dropped {} non-finite magnitudes before Benford analysis", non_finite);
        }
        log::debug!("Benford analyzer extracted {} leading digits", digits.len());

        Self { digits }
    }

    /// Leading digits of the cleaned series, in input order.
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Number of magnitudes that survived cleaning.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Whether no magnitude survived cleaning.
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Observed vs. expected frequencies and Z-scores for digits 1-9.
    pub fn analyze(&self) -> DigitDistributionReport {
        let mut counts = [0usize; 9];
        for &d in &self.digits {
            counts[d as usize - 1] += 1;
        }

        let total_count = self.digits.len();
        let n = total_count as f64;

        let rows = counts
            .iter()
            .zip(BENFORD_PROBS.iter())
            .enumerate()
            .map(|(i, (&actual_count, &expected_freq))| {
                let (actual_freq, z_score) = if total_count > 0 {
                    let p = actual_count as f64 / n;
                    let z = ((p - expected_freq).abs() - 1.0 / (2.0 * n))
                        / (expected_freq * (1.0 - expected_freq) / n).sqrt();
                    (p, z)
                } else {
                    (0.0, 0.0)
                };

                DigitRow {
                    digit: i as u8 + 1,
                    actual_count,
                    actual_freq,
                    expected_freq,
                    expected_count: expected_freq * n,
                    difference_abs: (actual_freq - expected_freq).abs(),
                    z_score,
                }
            })
            .collect();

        DigitDistributionReport { rows, total_count }
    }
}

/// Benford mean absolute deviation of a series, the risk-model feature.
pub fn deviation_score<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    BenfordAnalyzer::new(values).analyze().mean_absolute_deviation()
}
