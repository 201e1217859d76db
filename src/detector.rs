//! End-to-end fraud detector.
//!
//! Ties the pieces together the way a forensic analyst would run them:
//! split the labeled filings into a training and a hold-out set, rebalance
//! the training set only (synthetic rows must never leak into evaluation),
//! fit the injected risk model, then report hold-out metrics. The fitted
//! detector scores new records by position or by column name.

use crate::config::DetectorConfig;
use crate::dataset::{ClassCounts, LabeledDataset};
use crate::errors::{ForensicError, ForensicResult};
use crate::evaluation::ClassificationReport;
use crate::model::{LogisticRiskModel, RiskModel};
use crate::secure_rng::SecureRng;
use crate::smote::SyntheticOversampler;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Summary of one training run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrainingReport {
    /// Class sizes of the training split before oversampling
    pub train_counts_before: ClassCounts,
    /// Class sizes of the training split after oversampling
    pub train_counts_after: ClassCounts,
    /// Number of synthetic rows added to the training split
    pub n_synthetic: usize,
    /// Class sizes of the hold-out split
    pub test_counts: ClassCounts,
    /// Hold-out metrics at the configured decision threshold
    pub evaluation: ClassificationReport,
    /// Fraud probabilities of the hold-out rows, in hold-out order
    pub test_probabilities: Vec<f64>,
}

/// Fraud detector over an injectable risk model.
#[derive(Debug, Clone)]
pub struct FraudDetector<M: RiskModel = LogisticRiskModel> {
    config: DetectorConfig,
    oversampler: SyntheticOversampler,
    model: M,
    trained: bool,
}

impl FraudDetector<LogisticRiskModel> {
    /// Detector backed by the reference logistic model.
    pub fn with_default_model(config: DetectorConfig) -> ForensicResult<Self> {
        Self::new(config, LogisticRiskModel::default())
    }
}

impl<M: RiskModel> FraudDetector<M> {
    /// Create a detector around an unfitted model.
    pub fn new(config: DetectorConfig, model: M) -> ForensicResult<Self> {
        config.validate()?;
        let oversampler = SyntheticOversampler::new(config.smote.clone())?;
        Ok(Self {
            config,
            oversampler,
            model,
            trained: false,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Whether [`train`](Self::train) has completed successfully.
    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Split, rebalance the training split, fit and evaluate.
    pub fn train(
        &mut self,
        dataset: &LabeledDataset,
        rng: &mut SecureRng,
    ) -> ForensicResult<TrainingReport> {
        self.trained = false;
        let (train, test) = dataset.train_test_split(self.config.test_fraction, rng)?;
        let train_counts_before = train.class_counts();

        let resampled = self.oversampler.fit_resample(&train, rng)?;
        let n_synthetic = resampled.n_synthetic();
        let balanced = resampled.into_dataset();
        let train_counts_after = balanced.class_counts();

        self.model.fit(&balanced)?;

        let test_probabilities = self.model.predict_proba_batch(test.rows())?;
        let predicted: Vec<_> = test
            .rows()
            .iter()
            .map(|row| self.model.predict(row, self.config.decision_threshold))
            .collect::<ForensicResult<_>>()?;
        let evaluation = ClassificationReport::from_labels(test.labels(), &predicted)?;

        log::info!(
            "{} trained: {} synthetic rows, hold-out accuracy {:.3}, fraud recall {:.3}",
            self.model.name(),
            n_synthetic,
            evaluation.accuracy,
            evaluation.fraudulent.recall
        );

        self.trained = true;
        Ok(TrainingReport {
            train_counts_before,
            train_counts_after,
            n_synthetic,
            test_counts: test.class_counts(),
            evaluation,
            test_probabilities,
        })
    }

    /// Fraud probability of a record given in schema order.
    pub fn predict_risk(&self, record: &[f64]) -> ForensicResult<f64> {
        if !self.trained {
            return Err(ForensicError::ModelNotFitted {
                model: self.model.name().to_string(),
            });
        }
        self.model.predict_proba(record)
    }

    /// Fraud probability of a record given as `(column, value)` pairs.
    pub fn predict_risk_named(&self, values: &[(&str, f64)]) -> ForensicResult<f64> {
        let schema = self
            .model
            .fitted_schema()
            .filter(|_| self.trained)
            .ok_or_else(|| ForensicError::ModelNotFitted {
                model: self.model.name().to_string(),
            })?;
        let record = schema.row_from_named(values)?;
        self.predict_risk(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FeatureSchema;
    use crate::generators::{FinancialDataSimulator, SimulatorConfig};

    fn simulated(seed: u64) -> LabeledDataset {
        FinancialDataSimulator::new(SimulatorConfig {
            n_samples: 400,
            fraud_ratio: 0.08,
        })
        .unwrap()
        .generate(&mut SecureRng::with_seed(seed))
        .unwrap()
    }

    #[test]
    fn test_training_balances_only_the_training_split() {
        let data = simulated(42);
        let mut detector = FraudDetector::with_default_model(DetectorConfig::standard()).unwrap();
        let report = detector.train(&data, &mut SecureRng::with_seed(42)).unwrap();

        assert_eq!(
            report.train_counts_after.fraudulent,
            report.train_counts_after.legitimate
        );
        assert_eq!(
            report.n_synthetic,
            report.train_counts_before.legitimate - report.train_counts_before.fraudulent
        );
        // Hold-out is untouched
        assert_eq!(
            report.test_counts.total() + report.train_counts_before.total(),
            data.len()
        );
        assert_eq!(report.test_probabilities.len(), report.test_counts.total());
        assert!(detector.is_trained());
    }

    #[test]
    fn test_detector_separates_simulated_fraud() {
        let data = simulated(7);
        let mut detector = FraudDetector::with_default_model(DetectorConfig::standard()).unwrap();
        let report = detector.train(&data, &mut SecureRng::with_seed(7)).unwrap();

        assert!(report.evaluation.accuracy > 0.9, "accuracy {}", report.evaluation.accuracy);
        assert!(report.evaluation.fraudulent.recall > 0.7);
    }

    #[test]
    fn test_predict_risk_by_position_and_name() {
        let data = simulated(3);
        let mut detector = FraudDetector::with_default_model(DetectorConfig::standard()).unwrap();
        detector.train(&data, &mut SecureRng::with_seed(3)).unwrap();

        let suspicious = detector
            .predict_risk_named(&[
                ("current_ratio", 0.7),
                ("debt_to_equity", 1.4),
                ("net_margin", 0.16),
                ("benford_deviation", 0.35),
                ("text_complexity", 17.0),
            ])
            .unwrap();
        let healthy = detector.predict_risk(&[1.5, 0.5, 0.10, 0.03, 10.0]).unwrap();
        assert!(suspicious > 0.5);
        assert!(healthy < 0.5);
        assert!(suspicious > healthy);
    }

    #[test]
    fn test_untrained_detector_refuses_to_score() {
        let detector = FraudDetector::with_default_model(DetectorConfig::standard()).unwrap();
        assert!(matches!(
            detector.predict_risk(&[0.0; 5]),
            Err(ForensicError::ModelNotFitted { .. })
        ));
        assert!(detector.predict_risk_named(&[("current_ratio", 1.0)]).is_err());
    }

    #[test]
    fn test_schema_mismatch_on_prediction() {
        let data = simulated(5);
        let mut detector = FraudDetector::with_default_model(DetectorConfig::standard()).unwrap();
        detector.train(&data, &mut SecureRng::with_seed(5)).unwrap();

        assert!(matches!(
            detector.predict_risk(&[1.0, 2.0]),
            Err(ForensicError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            detector.predict_risk_named(&[
                ("current_ratio", 1.0),
                ("debt_to_equity", 1.0),
                ("net_margin", 1.0),
                ("benford_deviation", 1.0),
                ("unknown_ratio", 1.0),
            ]),
            Err(ForensicError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_custom_schema_is_opaque() {
        let schema = FeatureSchema::new(["alpha", "beta"]).unwrap();
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..60 {
            let t = i as f64 / 60.0;
            rows.push(vec![t, 1.0 - t]);
            labels.push(0);
        }
        for i in 0..8 {
            let t = i as f64 / 8.0;
            rows.push(vec![3.0 + t, 5.0 + t]);
            labels.push(1);
        }
        let data = LabeledDataset::from_binary_labels(schema, rows, &labels).unwrap();

        let mut detector = FraudDetector::new(DetectorConfig::fast(), LogisticRiskModel::default()).unwrap();
        detector.train(&data, &mut SecureRng::with_seed(11)).unwrap();
        assert!(detector.predict_risk(&[3.5, 5.5]).unwrap() > 0.5);
        assert!(detector.predict_risk_named(&[("beta", 0.5), ("alpha", 0.5)]).unwrap() < 0.5);
    }
}
