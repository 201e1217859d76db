//! Labeled feature datasets with an explicit column schema.
//!
//! A [`LabeledDataset`] is an ordered collection of fixed-width feature
//! rows plus a parallel vector of binary class labels. Rows are addressed
//! by integer offset only; there is no implicit index realignment, so
//! anything that refers back to a row (neighbor lists, provenance of
//! synthetic samples, train/test splits) stores plain `usize` offsets.

use crate::errors::{
    validate_all_finite, validate_parameter, validate_width, ForensicError, ForensicResult,
};
use crate::secure_rng::SecureRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column names of the default fraud-scoring feature set.
pub const DEFAULT_FRAUD_COLUMNS: [&str; 5] = [
    "current_ratio",
    "debt_to_equity",
    "net_margin",
    "benford_deviation",
    "text_complexity",
];

/// Binary class label of a feature record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClassLabel {
    /// Majority class (label 0)
    Legitimate,
    /// Minority class (label 1)
    Fraudulent,
}

impl ClassLabel {
    /// Numeric encoding: 0 for legitimate, 1 for fraudulent.
    pub fn as_u8(self) -> u8 {
        match self {
            ClassLabel::Legitimate => 0,
            ClassLabel::Fraudulent => 1,
        }
    }

    /// Decode a 0/1 label.
    pub fn from_u8(value: u8) -> ForensicResult<Self> {
        match value {
            0 => Ok(ClassLabel::Legitimate),
            1 => Ok(ClassLabel::Fraudulent),
            other => Err(ForensicError::InvalidParameter {
                parameter: "label".to_string(),
                value: other as f64,
                constraint: "0 (legitimate) or 1 (fraudulent)".to_string(),
            }),
        }
    }
}

/// Ordered, unique column names of a feature matrix.
///
/// Names are metadata only. Algorithms work on column positions and accept
/// any schema of numeric columns.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Create a schema, rejecting empty, blank or duplicate column names.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> ForensicResult<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(ForensicError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if name.trim().is_empty() || !seen.insert(name.as_str()) {
                return Err(ForensicError::InvalidParameter {
                    parameter: format!("column[{}] '{}'", i, name),
                    value: i as f64,
                    constraint: "column names must be non-blank and unique".to_string(),
                });
            }
        }

        Ok(Self { columns })
    }

    /// The five-column schema produced by the fraud feature extraction.
    pub fn fraud_default() -> Self {
        Self {
            columns: DEFAULT_FRAUD_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Arrange named values into a row in schema order.
    ///
    /// Every schema column must be present; extra names are rejected.
    pub fn row_from_named(&self, values: &[(&str, f64)]) -> ForensicResult<Vec<f64>> {
        validate_width(self.width(), values.len(), "named record")?;
        let mut row: Vec<Option<f64>> = vec![None; self.width()];
        for (name, value) in values {
            let position = self.position(name).ok_or_else(|| ForensicError::SchemaMismatch {
                expected: self.width(),
                actual: values.len(),
                context: format!("unknown column '{}'", name),
            })?;
            row[position] = Some(*value);
        }
        // Duplicated names leave a hole.
        row.iter()
            .enumerate()
            .map(|(i, value)| {
                value.ok_or_else(|| ForensicError::SchemaMismatch {
                    expected: self.width(),
                    actual: values.len(),
                    context: format!("missing column '{}'", self.columns[i]),
                })
            })
            .collect()
    }
}

/// Class sizes of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassCounts {
    /// Number of legitimate (label 0) rows
    pub legitimate: usize,
    /// Number of fraudulent (label 1) rows
    pub fraudulent: usize,
}

impl ClassCounts {
    /// Total number of rows.
    pub fn total(&self) -> usize {
        self.legitimate + self.fraudulent
    }

    /// Share of fraudulent rows, 0 for an empty dataset.
    pub fn fraud_ratio(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.fraudulent as f64 / self.total() as f64
        }
    }
}

/// Feature rows with a parallel label vector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabeledDataset {
    schema: FeatureSchema,
    rows: Vec<Vec<f64>>,
    labels: Vec<ClassLabel>,
}

impl LabeledDataset {
    /// Build a dataset, validating row widths, finiteness and label count.
    pub fn new(
        schema: FeatureSchema,
        rows: Vec<Vec<f64>>,
        labels: Vec<ClassLabel>,
    ) -> ForensicResult<Self> {
        if rows.len() != labels.len() {
            return Err(ForensicError::LabelMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            validate_width(schema.width(), row.len(), &format!("row {}", i))?;
            validate_all_finite(row, &format!("row {}", i))?;
        }
        Ok(Self { schema, rows, labels })
    }

    /// Build a dataset from 0/1 encoded labels.
    pub fn from_binary_labels(
        schema: FeatureSchema,
        rows: Vec<Vec<f64>>,
        labels: &[u8],
    ) -> ForensicResult<Self> {
        let labels = labels
            .iter()
            .map(|&l| ClassLabel::from_u8(l))
            .collect::<ForensicResult<Vec<_>>>()?;
        Self::new(schema, rows, labels)
    }

    /// Column schema.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Feature rows in order.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Labels, parallel to [`rows`](Self::rows).
    pub fn labels(&self) -> &[ClassLabel] {
        &self.labels
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of feature columns.
    pub fn width(&self) -> usize {
        self.schema.width()
    }

    /// Row and label at an offset.
    pub fn get(&self, offset: usize) -> Option<(&[f64], ClassLabel)> {
        self.rows
            .get(offset)
            .map(|row| (row.as_slice(), self.labels[offset]))
    }

    /// Offsets of all rows carrying `label`, in ascending order.
    pub fn offsets_of(&self, label: ClassLabel) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Class sizes.
    pub fn class_counts(&self) -> ClassCounts {
        let fraudulent = self
            .labels
            .iter()
            .filter(|&&l| l == ClassLabel::Fraudulent)
            .count();
        ClassCounts {
            legitimate: self.labels.len() - fraudulent,
            fraudulent,
        }
    }

    /// Values of one column, in row order.
    pub fn column(&self, position: usize) -> Option<Vec<f64>> {
        if position >= self.width() {
            return None;
        }
        Some(self.rows.iter().map(|row| row[position]).collect())
    }

    /// New dataset holding the rows at `offsets`, in the given order.
    pub fn select(&self, offsets: &[usize]) -> ForensicResult<Self> {
        let mut rows = Vec::with_capacity(offsets.len());
        let mut labels = Vec::with_capacity(offsets.len());
        for &offset in offsets {
            let (row, label) = self.get(offset).ok_or(ForensicError::InsufficientData {
                required: offset + 1,
                actual: self.len(),
            })?;
            rows.push(row.to_vec());
            labels.push(label);
        }
        Ok(Self {
            schema: self.schema.clone(),
            rows,
            labels,
        })
    }

    /// Copy of this dataset with extra rows appended after the existing ones.
    pub(crate) fn with_appended(&self, rows: Vec<Vec<f64>>, labels: Vec<ClassLabel>) -> Self {
        let mut all_rows = Vec::with_capacity(self.rows.len() + rows.len());
        all_rows.extend(self.rows.iter().cloned());
        all_rows.extend(rows);
        let mut all_labels = Vec::with_capacity(self.labels.len() + labels.len());
        all_labels.extend_from_slice(&self.labels);
        all_labels.extend(labels);
        Self {
            schema: self.schema.clone(),
            rows: all_rows,
            labels: all_labels,
        }
    }

    /// Randomly partition rows into a training and a test dataset.
    ///
    /// `test_fraction` of the rows (rounded up) go to the test set. Both
    /// parts keep the shuffled order. The rows are shuffled with the
    /// supplied generator, so a fixed seed yields a fixed split.
    pub fn train_test_split(
        &self,
        test_fraction: f64,
        rng: &mut SecureRng,
    ) -> ForensicResult<(Self, Self)> {
        validate_parameter(test_fraction, 0.0, 1.0, "test_fraction")?;
        if test_fraction == 0.0 || test_fraction == 1.0 {
            return Err(ForensicError::InvalidParameter {
                parameter: "test_fraction".to_string(),
                value: test_fraction,
                constraint: "(0, 1) exclusive".to_string(),
            });
        }
        if self.len() < 2 {
            return Err(ForensicError::InsufficientData {
                required: 2,
                actual: self.len(),
            });
        }

        let mut offsets: Vec<usize> = (0..self.len()).collect();
        rng.shuffle(&mut offsets);

        let n_test = ((self.len() as f64) * test_fraction).ceil() as usize;
        let n_test = n_test.clamp(1, self.len() - 1);
        let (test, train) = offsets.split_at(n_test);

        Ok((self.select(train)?, self.select(test)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_dataset() -> LabeledDataset {
        let schema = FeatureSchema::new(["a", "b"]).unwrap();
        LabeledDataset::from_binary_labels(
            schema,
            vec![
                vec![0.0, 1.0],
                vec![1.0, 1.0],
                vec![2.0, 1.0],
                vec![3.0, 1.0],
                vec![4.0, 1.0],
            ],
            &[0, 1, 0, 0, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_schema_validation() {
        assert!(FeatureSchema::new(Vec::<String>::new()).is_err());
        assert!(FeatureSchema::new(["a", "a"]).is_err());
        assert!(FeatureSchema::new(["a", " "]).is_err());

        let schema = FeatureSchema::fraud_default();
        assert_eq!(schema.width(), 5);
        assert_eq!(schema.position("benford_deviation"), Some(3));
        assert_eq!(schema.position("missing"), None);
    }

    #[test]
    fn test_row_from_named() {
        let schema = FeatureSchema::new(["x", "y"]).unwrap();
        let row = schema.row_from_named(&[("y", 2.0), ("x", 1.0)]).unwrap();
        assert_eq!(row, vec![1.0, 2.0]);

        assert!(matches!(
            schema.row_from_named(&[("x", 1.0)]),
            Err(ForensicError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            schema.row_from_named(&[("x", 1.0), ("z", 2.0)]),
            Err(ForensicError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            schema.row_from_named(&[("x", 1.0), ("x", 2.0)]),
            Err(ForensicError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_dataset_validation() {
        let schema = FeatureSchema::new(["a", "b"]).unwrap();
        assert!(matches!(
            LabeledDataset::from_binary_labels(schema.clone(), vec![vec![1.0, 2.0]], &[0, 1]),
            Err(ForensicError::LabelMismatch { rows: 1, labels: 2 })
        ));
        assert!(matches!(
            LabeledDataset::from_binary_labels(schema.clone(), vec![vec![1.0]], &[0]),
            Err(ForensicError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            LabeledDataset::from_binary_labels(schema.clone(), vec![vec![1.0, f64::NAN]], &[0]),
            Err(ForensicError::NumericalError { .. })
        ));
        assert!(LabeledDataset::from_binary_labels(schema, vec![vec![1.0, 2.0]], &[2]).is_err());
    }

    #[test]
    fn test_partition_by_offsets() {
        let data = toy_dataset();
        assert_eq!(data.offsets_of(ClassLabel::Fraudulent), vec![1, 4]);
        assert_eq!(data.offsets_of(ClassLabel::Legitimate), vec![0, 2, 3]);

        let counts = data.class_counts();
        assert_eq!(counts.legitimate, 3);
        assert_eq!(counts.fraudulent, 2);
        assert!((counts.fraud_ratio() - 0.4).abs() < 1e-12);
        assert_eq!(data.column(0).unwrap(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(data.column(2), None);
    }

    #[test]
    fn test_select_preserves_given_order() {
        let data = toy_dataset();
        let picked = data.select(&[4, 0]).unwrap();
        assert_eq!(picked.rows(), &[vec![4.0, 1.0], vec![0.0, 1.0]]);
        assert_eq!(picked.labels(), &[ClassLabel::Fraudulent, ClassLabel::Legitimate]);
        assert!(data.select(&[9]).is_err());
    }

    #[test]
    fn test_train_test_split_is_partition() {
        let data = toy_dataset();
        let mut rng = SecureRng::with_seed(42);
        let (train, test) = data.train_test_split(0.3, &mut rng).unwrap();

        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 3);

        let mut firsts: Vec<f64> = train.rows().iter().chain(test.rows()).map(|r| r[0]).collect();
        firsts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(firsts, vec![0.0, 1.0, 2.0, 3.0, 4.0]);

        let mut rng = SecureRng::with_seed(42);
        let (train_again, _) = data.train_test_split(0.3, &mut rng).unwrap();
        assert_eq!(train, train_again);
    }

    #[test]
    fn test_train_test_split_rejects_bad_fraction() {
        let data = toy_dataset();
        let mut rng = SecureRng::with_seed(1);
        assert!(data.train_test_split(0.0, &mut rng).is_err());
        assert!(data.train_test_split(1.0, &mut rng).is_err());
        assert!(data.train_test_split(-0.2, &mut rng).is_err());
    }
}
