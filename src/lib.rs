//! # Forensic Finance
//!
//! Statistical screening tools for forensic accounting and fraud detection.
//!
//! The crate pairs a digit-distribution test for fabricated figures with a
//! synthetic minority oversampler for heavily imbalanced fraud datasets, and
//! wires both into a pluggable fraud-risk pipeline.
//!
//! ## Key Features
//!
//! - **Benford Analysis**: First-digit frequencies with per-digit Z-statistics,
//!   chi-square goodness of fit and MAD conformity bands
//! - **Synthetic Oversampling**: SMOTE-style interpolation between minority
//!   neighbors with full provenance of every synthetic row
//! - **Pluggable Risk Models**: Any classifier implementing [`RiskModel`];
//!   a regularized logistic regression ships as the reference model
//! - **Reproducibility**: All randomness flows through an explicit, seedable
//!   [`SecureRng`] handed to each operation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forensic_finance::{
//!     BenfordAnalyzer, DetectorConfig, FinancialDataSimulator, FraudDetector,
//!     SecureRng, SimulatorConfig,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Ledger amounts: do the leading digits look natural?
//!     let amounts = vec![123.0, 234.0, 345.0, 119.0, 150.0, 199.0];
//!     let report = BenfordAnalyzer::new(amounts).analyze();
//!     for row in &report.rows {
//!         println!("digit {}: {:.3} vs {:.3} (Z = {:.2})",
//!             row.digit, row.actual_freq, row.expected_freq, row.z_score);
//!     }
//!
//!     // Imbalanced filings: rebalance, train and score
//!     let mut rng = SecureRng::with_seed(42);
//!     let filings = FinancialDataSimulator::new(SimulatorConfig::default())?
//!         .generate(&mut rng)?;
//!     let mut detector = FraudDetector::with_default_model(DetectorConfig::standard())?;
//!     let training = detector.train(&filings, &mut rng)?;
//!     println!("hold-out fraud recall: {:.3}", training.evaluation.fraudulent.recall);
//!
//!     let risk = detector.predict_risk_named(&[
//!         ("current_ratio", 0.7),
//!         ("debt_to_equity", 1.4),
//!         ("net_margin", 0.16),
//!         ("benford_deviation", 0.35),
//!         ("text_complexity", 17.0),
//!     ])?;
//!     println!("fraud probability: {:.3}", risk);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! [`BenfordAnalyzer`] and [`SyntheticOversampler`] are independent and can
//! be used on their own. [`FraudDetector`] orchestrates splitting,
//! oversampling of the training split, fitting and hold-out evaluation over
//! any [`RiskModel`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod dataset;
pub mod errors;
pub mod secure_rng;

// Analysis methods
pub mod benford;
pub mod neighbors;
pub mod smote;

// Modeling
pub mod detector;
pub mod evaluation;
pub mod generators;
pub mod model;

// Re-exports for convenience - main public API
pub use config::{DetectorConfig, LogisticConfig, SmoteConfig};
pub use dataset::{ClassCounts, ClassLabel, FeatureSchema, LabeledDataset};
pub use errors::{ForensicError, ForensicResult};
pub use secure_rng::SecureRng;

// Benford exports
pub use benford::{
    benford_probability, deviation_score, leading_digit, BenfordAnalyzer, ChiSquareTest,
    Conformity, DigitDistributionReport, DigitRow, BENFORD_PROBS,
};

// Oversampling exports
pub use smote::{ResampledDataset, SyntheticOversampler, SyntheticSample};

// Model and pipeline exports
pub use detector::{FraudDetector, TrainingReport};
pub use evaluation::{ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use model::{LogisticRiskModel, RiskModel};

// Data generation exports
pub use generators::{
    generate_benford_demo_series, BenfordDemoConfig, FinancialDataSimulator, SimulatorConfig,
};
