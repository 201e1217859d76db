//! Hold-out evaluation of a fitted risk model.
//!
//! Binary confusion matrix and per-class precision, recall and F1, with
//! the fraudulent class as the positive class. Ratios with an empty
//! denominator are reported as 0.

use crate::dataset::ClassLabel;
use crate::errors::{ForensicError, ForensicResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Binary confusion matrix (positive = fraudulent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfusionMatrix {
    /// Legitimate rows classified as legitimate
    pub true_negative: usize,
    /// Legitimate rows classified as fraudulent
    pub false_positive: usize,
    /// Fraudulent rows classified as legitimate
    pub false_negative: usize,
    /// Fraudulent rows classified as fraudulent
    pub true_positive: usize,
}

impl ConfusionMatrix {
    /// Tally actual against predicted labels.
    pub fn from_labels(actual: &[ClassLabel], predicted: &[ClassLabel]) -> ForensicResult<Self> {
        if actual.len() != predicted.len() {
            return Err(ForensicError::LabelMismatch {
                rows: actual.len(),
                labels: predicted.len(),
            });
        }

        let mut matrix = Self::default();
        for (a, p) in actual.iter().zip(predicted) {
            match (a, p) {
                (ClassLabel::Legitimate, ClassLabel::Legitimate) => matrix.true_negative += 1,
                (ClassLabel::Legitimate, ClassLabel::Fraudulent) => matrix.false_positive += 1,
                (ClassLabel::Fraudulent, ClassLabel::Legitimate) => matrix.false_negative += 1,
                (ClassLabel::Fraudulent, ClassLabel::Fraudulent) => matrix.true_positive += 1,
            }
        }
        Ok(matrix)
    }

    /// Number of tallied rows.
    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    /// Share of correctly classified rows.
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_negative + self.true_positive, self.total())
    }
}

/// Precision, recall and F1 of one class.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassMetrics {
    /// TP / (TP + FP) for this class
    pub precision: f64,
    /// TP / (TP + FN) for this class
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
    /// Number of actual rows of this class
    pub support: usize,
}

impl ClassMetrics {
    fn new(hits: usize, predicted: usize, support: usize) -> Self {
        let precision = ratio(hits, predicted);
        let recall = ratio(hits, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
            support,
        }
    }
}

/// Per-class metrics plus accuracy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassificationReport {
    /// Underlying confusion matrix
    pub confusion: ConfusionMatrix,
    /// Metrics of the legitimate class
    pub legitimate: ClassMetrics,
    /// Metrics of the fraudulent class
    pub fraudulent: ClassMetrics,
    /// Share of correctly classified rows
    pub accuracy: f64,
}

impl ClassificationReport {
    /// Build a report from actual and predicted labels.
    pub fn from_labels(actual: &[ClassLabel], predicted: &[ClassLabel]) -> ForensicResult<Self> {
        let confusion = ConfusionMatrix::from_labels(actual, predicted)?;
        let c = &confusion;

        Ok(Self {
            legitimate: ClassMetrics::new(
                c.true_negative,
                c.true_negative + c.false_negative,
                c.true_negative + c.false_positive,
            ),
            fraudulent: ClassMetrics::new(
                c.true_positive,
                c.true_positive + c.false_positive,
                c.true_positive + c.false_negative,
            ),
            accuracy: c.accuracy(),
            confusion,
        })
    }

    /// Unweighted mean of the two class F1 scores.
    pub fn macro_f1(&self) -> f64 {
        (self.legitimate.f1 + self.fraudulent.f1) / 2.0
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
