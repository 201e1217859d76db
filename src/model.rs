//! Risk model capability and a reference logistic implementation.
//!
//! The fraud pipeline only needs two things from a classifier: learn from a
//! (rebalanced) labeled dataset, then return the probability that a new
//! record is fraudulent. [`RiskModel`] captures exactly that, so any
//! classifier can be injected into [`FraudDetector`](crate::detector::FraudDetector)
//! without touching the Benford analyzer or the oversampler.

use crate::config::LogisticConfig;
use crate::dataset::{ClassLabel, FeatureSchema, LabeledDataset};
use crate::errors::{validate_all_finite, validate_width, ForensicError, ForensicResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Standard deviations below this are treated as constant columns.
const MIN_COLUMN_STD: f64 = 1e-12;

/// A binary classifier that scores the probability of fraud.
pub trait RiskModel {
    /// Human-readable model name used in logs and errors.
    fn name(&self) -> &str;

    /// Train on a labeled dataset.
    fn fit(&mut self, dataset: &LabeledDataset) -> ForensicResult<()>;

    /// Probability that `record` belongs to the fraudulent class.
    ///
    /// `record` must have the width of the schema the model was fitted on.
    fn predict_proba(&self, record: &[f64]) -> ForensicResult<f64>;

    /// Schema seen during fitting, `None` before [`fit`](Self::fit).
    fn fitted_schema(&self) -> Option<&FeatureSchema>;

    /// Hard classification at `threshold`.
    fn predict(&self, record: &[f64], threshold: f64) -> ForensicResult<ClassLabel> {
        Ok(if self.predict_proba(record)? >= threshold {
            ClassLabel::Fraudulent
        } else {
            ClassLabel::Legitimate
        })
    }

    /// Fraud probabilities for many records.
    fn predict_proba_batch(&self, records: &[Vec<f64>]) -> ForensicResult<Vec<f64>> {
        records.iter().map(|r| self.predict_proba(r)).collect()
    }
}

impl<M: RiskModel + ?Sized> RiskModel for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fit(&mut self, dataset: &LabeledDataset) -> ForensicResult<()> {
        (**self).fit(dataset)
    }

    fn predict_proba(&self, record: &[f64]) -> ForensicResult<f64> {
        (**self).predict_proba(record)
    }

    fn fitted_schema(&self) -> Option<&FeatureSchema> {
        (**self).fitted_schema()
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Learned parameters of [`LogisticRiskModel`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogisticParameters {
    /// Feature schema the model was trained on
    pub schema: FeatureSchema,
    /// Per-column means used for standardization
    pub means: Vec<f64>,
    /// Per-column standard deviations used for standardization
    pub stds: Vec<f64>,
    /// Weights on standardized features, in schema order
    pub weights: Vec<f64>,
    /// Intercept
    pub intercept: f64,
    /// Iterations run before stopping
    pub iterations: usize,
    /// Whether the gradient tolerance was reached
    pub converged: bool,
}

/// L2-regularized logistic regression fitted by full-batch gradient descent.
///
/// Features are standardized with the training means and standard
/// deviations; constant columns get a unit scale.
#[derive(Debug, Clone, Default)]
pub struct LogisticRiskModel {
    config: LogisticConfig,
    params: Option<LogisticParameters>,
}

impl LogisticRiskModel {
    /// Create an unfitted model.
    pub fn new(config: LogisticConfig) -> ForensicResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            params: None,
        })
    }

    /// Learned parameters, `None` before fitting.
    pub fn parameters(&self) -> Option<&LogisticParameters> {
        self.params.as_ref()
    }

    fn column_moments(dataset: &LabeledDataset) -> (Vec<f64>, Vec<f64>) {
        let n = dataset.len() as f64;
        let width = dataset.width();
        let mut means = vec![0.0; width];
        for row in dataset.rows() {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v / n;
            }
        }
        let mut stds = vec![0.0; width];
        for row in dataset.rows() {
            for ((s, v), m) in stds.iter_mut().zip(row).zip(&means) {
                *s += (v - m) * (v - m) / n;
            }
        }
        for s in stds.iter_mut() {
            *s = s.sqrt();
            if *s < MIN_COLUMN_STD {
                *s = 1.0;
            }
        }
        (means, stds)
    }
}

impl RiskModel for LogisticRiskModel {
    fn name(&self) -> &str {
        "LogisticRiskModel"
    }

    fn fit(&mut self, dataset: &LabeledDataset) -> ForensicResult<()> {
        let counts = dataset.class_counts();
        if dataset.is_empty() {
            return Err(ForensicError::InsufficientData {
                required: 2,
                actual: 0,
            });
        }
        if counts.fraudulent == 0 || counts.legitimate == 0 {
            return Err(ForensicError::ModelFitError {
                reason: format!(
                    "both classes are required, got {} legitimate and {} fraudulent rows",
                    counts.legitimate, counts.fraudulent
                ),
            });
        }

        let (means, stds) = Self::column_moments(dataset);
        let standardized: Vec<Vec<f64>> = dataset
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&means)
                    .zip(&stds)
                    .map(|((v, m), s)| (v - m) / s)
                    .collect()
            })
            .collect();
        let targets: Vec<f64> = dataset.labels().iter().map(|l| l.as_u8() as f64).collect();

        let n = dataset.len() as f64;
        let width = dataset.width();
        let mut weights = vec![0.0; width];
        let mut intercept = 0.0;
        let mut converged = false;
        let mut iterations = 0;

        for iteration in 0..self.config.max_iterations {
            iterations = iteration + 1;
            let mut grad_w = vec![0.0; width];
            let mut grad_b = 0.0;

            for (x, &y) in standardized.iter().zip(&targets) {
                let z = intercept + x.iter().zip(&weights).map(|(a, b)| a * b).sum::<f64>();
                let err = sigmoid(z) - y;
                grad_b += err / n;
                for (g, xi) in grad_w.iter_mut().zip(x) {
                    *g += err * xi / n;
                }
            }
            for (g, w) in grad_w.iter_mut().zip(&weights) {
                *g += self.config.l2_penalty * w;
            }

            let max_grad = grad_w.iter().fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if !max_grad.is_finite() {
                return Err(ForensicError::NumericalError {
                    reason: format!("gradient diverged at iteration {}", iterations),
                });
            }

            intercept -= self.config.learning_rate * grad_b;
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= self.config.learning_rate * g;
            }

            if max_grad < self.config.convergence_tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            log::debug!(
                "{} stopped after {} iterations without reaching tolerance {}",
                self.name(),
                iterations,
                self.config.convergence_tolerance
            );
        }
        log::info!(
            "{} fitted on {} rows ({} fraudulent) in {} iterations",
            self.name(),
            dataset.len(),
            counts.fraudulent,
            iterations
        );

        self.params = Some(LogisticParameters {
            schema: dataset.schema().clone(),
            means,
            stds,
            weights,
            intercept,
            iterations,
            converged,
        });
        Ok(())
    }

    fn predict_proba(&self, record: &[f64]) -> ForensicResult<f64> {
        let params = self.params.as_ref().ok_or_else(|| ForensicError::ModelNotFitted {
            model: self.name().to_string(),
        })?;
        validate_width(params.schema.width(), record.len(), "predict_proba")?;
        validate_all_finite(record, "record")?;

        let z = params.intercept
            + record
                .iter()
                .zip(&params.means)
                .zip(&params.stds)
                .zip(&params.weights)
                .map(|(((v, m), s), w)| (v - m) / s * w)
                .sum::<f64>();
        Ok(sigmoid(z))
    }

    fn fitted_schema(&self) -> Option<&FeatureSchema> {
        self.params.as_ref().map(|p| &p.schema)
    }
}
