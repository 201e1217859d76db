//! Synthetic Minority Over-sampling Technique (SMOTE).
//!
//! Fraud datasets are heavily imbalanced: a handful of fraudulent filings
//! against thousands of legitimate ones. The oversampler brings the
//! fraudulent (minority) class up to parity with the legitimate class by
//! synthesizing new minority rows on the line segments between a minority
//! row and one of its nearest minority neighbors.
//!
//! ## Algorithm
//!
//! 1. Partition row offsets by label.
//! 2. No-op when the minority is empty or already at or above parity.
//! 3. Index the minority rows and give every one of them a neighbor list
//!    of `min(k + 1, n_minority)` offsets, itself first.
//! 4. `n_majority - n_minority` times: draw an origin uniformly, draw one
//!    of its neighbors (excluding itself), draw `gap ~ U[0, 1)` and emit
//!    `origin + gap * (neighbor - origin)`. The gap is shared by every
//!    feature dimension.
//! 5. Append the synthetic rows after the untouched original rows.
//!
//! Origins and neighbors are drawn with replacement. Distances are computed
//! on raw feature values.

use crate::config::SmoteConfig;
use crate::dataset::{ClassLabel, LabeledDataset};
use crate::errors::ForensicResult;
use crate::neighbors::NearestNeighbors;
use crate::secure_rng::SecureRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Provenance of one synthetic row.
///
/// Offsets refer to rows of the dataset passed to
/// [`SyntheticOversampler::fit_resample`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyntheticSample {
    /// Offset of the origin row
    pub origin: usize,
    /// Offset of the neighbor row interpolated towards
    pub neighbor: usize,
    /// Interpolation gap in [0, 1)
    pub gap: f64,
}

/// Output of the oversampler.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResampledDataset {
    /// Original rows followed by synthetic rows
    pub dataset: LabeledDataset,
    /// Number of leading rows copied from the input
    pub n_original: usize,
    /// Provenance of each synthetic row, in output order
    pub samples: Vec<SyntheticSample>,
}

impl ResampledDataset {
    fn unchanged(dataset: &LabeledDataset) -> Self {
        Self {
            dataset: dataset.clone(),
            n_original: dataset.len(),
            samples: Vec::new(),
        }
    }

    /// Number of synthetic rows appended.
    pub fn n_synthetic(&self) -> usize {
        self.samples.len()
    }

    /// Whether resampling left the input unchanged.
    pub fn is_noop(&self) -> bool {
        self.samples.is_empty()
    }

    /// The synthetic rows only.
    pub fn synthetic_rows(&self) -> &[Vec<f64>] {
        &self.dataset.rows()[self.n_original..]
    }

    /// Consume the result, keeping only the rebalanced dataset.
    pub fn into_dataset(self) -> LabeledDataset {
        self.dataset
    }
}

/// SMOTE oversampler for the fraudulent (minority) class.
#[derive(Debug, Clone)]
pub struct SyntheticOversampler {
    config: SmoteConfig,
}

impl Default for SyntheticOversampler {
    fn default() -> Self {
        Self {
            config: SmoteConfig::default(),
        }
    }
}

impl SyntheticOversampler {
    /// Create an oversampler, rejecting a zero neighborhood size.
    pub fn new(config: SmoteConfig) -> ForensicResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &SmoteConfig {
        &self.config
    }

    /// Rebalance `dataset` by synthesizing fraudulent rows.
    ///
    /// The input is never modified. When no rows are needed the result is
    /// an exact copy with no synthetic samples. A fixed generator seed yields
    /// bit-identical synthetic rows.
    pub fn fit_resample(
        &self,
        dataset: &LabeledDataset,
        rng: &mut SecureRng,
    ) -> ForensicResult<ResampledDataset> {
        let minority_offsets = dataset.offsets_of(ClassLabel::Fraudulent);
        let counts = dataset.class_counts();
        let n_minority = counts.fraudulent;
        let n_majority = counts.legitimate;

        log::info!(
            "Before SMOTE - frauds: {} / total: {}",
            n_minority,
            dataset.len()
        );

        if n_minority == 0 || n_minority >= n_majority {
            log::debug!(
                "SMOTE no-op: {} minority vs {} majority rows",
                n_minority,
                n_majority
            );
            return Ok(ResampledDataset::unchanged(dataset));
        }

        let n_synthetic = n_majority - n_minority;

        let minority_points: Vec<&[f64]> = minority_offsets
            .iter()
            .map(|&offset| dataset.rows()[offset].as_slice())
            .collect();
        let index = NearestNeighbors::fit(minority_points)?;
        let n_neighbors = (self.config.k_neighbors + 1).min(n_minority);
        let neighbor_lists = index.kneighbors_of_members(n_neighbors);

        if n_neighbors < 2 {
            log::warn!(
                "Only {} minority row(s); synthetic rows will duplicate it",
                n_minority
            );
        }
        log::debug!(
            "SMOTE generating {} rows from {} minority rows with {} neighbors each",
            n_synthetic,
            n_minority,
            n_neighbors
        );

        let mut rows = Vec::with_capacity(n_synthetic);
        let mut samples = Vec::with_capacity(n_synthetic);

        for _ in 0..n_synthetic {
            let origin = rng.usize(0..n_minority);
            let neighbors = &neighbor_lists[origin];
            // Position 0 is the origin itself.
            let neighbor = if neighbors.len() > 1 {
                neighbors[rng.usize(1..neighbors.len())]
            } else {
                origin
            };
            let gap = rng.f64();

            let origin_row = &dataset.rows()[minority_offsets[origin]];
            let neighbor_row = &dataset.rows()[minority_offsets[neighbor]];
            rows.push(interpolate(origin_row, neighbor_row, gap));
            samples.push(SyntheticSample {
                origin: minority_offsets[origin],
                neighbor: minority_offsets[neighbor],
                gap,
            });
        }

        let resampled = ResampledDataset {
            dataset: dataset.with_appended(rows, vec![ClassLabel::Fraudulent; n_synthetic]),
            n_original: dataset.len(),
            samples,
        };

        log::info!(
            "After SMOTE - frauds: {} / total: {}",
            resampled.dataset.class_counts().fraudulent,
            resampled.dataset.len()
        );

        Ok(resampled)
    }
}

/// Point on the segment from `origin` to `neighbor` at fraction `gap`.
#[inline]
pub fn interpolate(origin: &[f64], neighbor: &[f64], gap: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(neighbor)
        .map(|(&p, &n)| p + gap * (n - p))
        .collect()
}
