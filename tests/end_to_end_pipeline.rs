//! End-to-end integration tests for the fraud screening workflow
//!
//! Simulated filings flow through splitting, oversampling, fitting and
//! scoring, with a user-supplied model plugged in through the trait seam.

use forensic_finance::{
    deviation_score, generate_benford_demo_series, BenfordDemoConfig, ClassLabel, DetectorConfig,
    FeatureSchema, FinancialDataSimulator, ForensicError, ForensicResult, FraudDetector,
    LabeledDataset, RiskModel, SecureRng, SimulatorConfig,
};

/// Flags rows whose Benford deviation exceeds the midpoint of the class means.
#[derive(Debug, Default)]
struct ThresholdModel {
    schema: Option<FeatureSchema>,
    column: usize,
    cut: f64,
}

impl RiskModel for ThresholdModel {
    fn name(&self) -> &str {
        "ThresholdModel"
    }

    fn fit(&mut self, dataset: &LabeledDataset) -> ForensicResult<()> {
        let column = dataset.schema().position("benford_deviation").ok_or_else(|| {
            ForensicError::ModelFitError {
                reason: "benford_deviation column required".to_string(),
            }
        })?;
        let mean_of = |label| {
            let offsets = dataset.offsets_of(label);
            offsets.iter().map(|&i| dataset.rows()[i][column]).sum::<f64>()
                / offsets.len().max(1) as f64
        };
        self.cut = (mean_of(ClassLabel::Legitimate) + mean_of(ClassLabel::Fraudulent)) / 2.0;
        self.column = column;
        self.schema = Some(dataset.schema().clone());
        Ok(())
    }

    fn predict_proba(&self, record: &[f64]) -> ForensicResult<f64> {
        if self.schema.is_none() {
            return Err(ForensicError::ModelNotFitted {
                model: self.name().to_string(),
            });
        }
        Ok(if record[self.column] > self.cut { 0.9 } else { 0.1 })
    }

    fn fitted_schema(&self) -> Option<&FeatureSchema> {
        self.schema.as_ref()
    }
}

#[test]
fn test_full_workflow_with_reference_model() {
    let mut rng = SecureRng::with_seed(42);
    let filings = FinancialDataSimulator::new(SimulatorConfig::default())
        .unwrap()
        .generate(&mut rng)
        .unwrap();
    assert_eq!(filings.class_counts().fraudulent, 50);

    let mut detector = FraudDetector::with_default_model(DetectorConfig::standard()).unwrap();
    let report = detector.train(&filings, &mut rng).unwrap();

    assert_eq!(report.test_counts.total(), 300);
    assert_eq!(report.train_counts_before.total(), 700);
    assert_eq!(
        report.train_counts_after.fraudulent,
        report.train_counts_after.legitimate
    );
    assert!(report.evaluation.accuracy > 0.9);
    assert!(report.evaluation.fraudulent.support > 0);
    assert!(report
        .test_probabilities
        .iter()
        .all(|p| (0.0..=1.0).contains(p)));

    let risky = detector
        .predict_risk_named(&[
            ("text_complexity", 18.0),
            ("benford_deviation", 0.4),
            ("net_margin", 0.2),
            ("debt_to_equity", 1.5),
            ("current_ratio", 0.6),
        ])
        .unwrap();
    assert!(risky > 0.5, "fraud-like filing scored {}", risky);
}

#[test]
fn test_custom_model_through_trait_seam() {
    let mut rng = SecureRng::with_seed(17);
    let filings = FinancialDataSimulator::new(SimulatorConfig {
        n_samples: 500,
        fraud_ratio: 0.1,
    })
    .unwrap()
    .generate(&mut rng)
    .unwrap();

    let mut detector =
        FraudDetector::new(DetectorConfig::fast(), ThresholdModel::default()).unwrap();
    let report = detector.train(&filings, &mut rng).unwrap();
    assert!(report.evaluation.fraudulent.recall >= 0.5);
    assert_eq!(detector.model().name(), "ThresholdModel");

    let score = detector.predict_risk(&[1.5, 0.5, 0.1, 0.02, 10.0]).unwrap();
    assert_eq!(score, 0.1);
}

#[test]
fn test_boxed_model_is_accepted() {
    let mut rng = SecureRng::with_seed(8);
    let filings = FinancialDataSimulator::new(SimulatorConfig {
        n_samples: 300,
        fraud_ratio: 0.1,
    })
    .unwrap()
    .generate(&mut rng)
    .unwrap();

    let model: Box<dyn RiskModel> = Box::new(ThresholdModel::default());
    let mut detector = FraudDetector::new(DetectorConfig::fast(), model).unwrap();
    detector.train(&filings, &mut rng).unwrap();
    assert!(detector.predict_risk(&[0.8, 1.2, 0.15, 0.3, 16.0]).unwrap() > 0.5);
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let config = DetectorConfig {
        test_fraction: 1.5,
        ..DetectorConfig::standard()
    };
    assert!(matches!(
        FraudDetector::with_default_model(config),
        Err(ForensicError::InvalidParameter { .. })
    ));
}

#[test]
fn test_benford_feature_separates_invented_ledgers() {
    let mut rng = SecureRng::with_seed(99);
    let natural = generate_benford_demo_series(
        &BenfordDemoConfig {
            n_fabricated: 0,
            ..BenfordDemoConfig::default()
        },
        &mut rng,
    )
    .unwrap();
    let invented = generate_benford_demo_series(
        &BenfordDemoConfig {
            n_legitimate: 0,
            n_fabricated: 1000,
            ..BenfordDemoConfig::default()
        },
        &mut rng,
    )
    .unwrap();

    let natural_score = deviation_score(natural);
    let invented_score = deviation_score(invented);
    assert!(natural_score < 0.02, "natural ledger scored {}", natural_score);
    assert!(invented_score > 0.04, "invented ledger scored {}", invented_score);
}
