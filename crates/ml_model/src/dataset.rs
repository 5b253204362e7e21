//! Dataset and batching for Burn training.

use burn::prelude::*;
use preprocessing::Matrix;

/// A single training example: one preprocessed feature row and its target
/// loan amount.
#[derive(Debug, Clone)]
pub struct LoanDatasetItem {
    /// Feature vector for this row.
    pub features: Vec<f32>,
    /// Target loan amount.
    pub target: f32,
}

/// Dataset over preprocessed feature rows.
#[derive(Debug, Clone)]
pub struct LoanDataset {
    items: Vec<LoanDatasetItem>,
    n_features: usize,
}

impl LoanDataset {
    /// Builds a dataset from a feature matrix and aligned target vector.
    ///
    /// Panics if the row counts disagree; callers hold that invariant via
    /// the splitter.
    #[must_use]
    pub fn from_matrix(features: &Matrix, targets: &[f64]) -> Self {
        assert_eq!(
            features.n_rows(),
            targets.len(),
            "feature/target row count mismatch"
        );

        let items = features
            .rows()
            .zip(targets)
            .map(|(row, &target)| LoanDatasetItem {
                features: row.iter().map(|&v| v as f32).collect(),
                target: target as f32,
            })
            .collect();

        Self {
            items,
            n_features: features.n_cols(),
        }
    }

    /// Returns the feature width of every item.
    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }
}

impl burn::data::dataset::Dataset<LoanDatasetItem> for LoanDataset {
    fn get(&self, index: usize) -> Option<LoanDatasetItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A batch of training data.
#[derive(Debug, Clone)]
pub struct LoanBatch<B: Backend> {
    /// Input features tensor of shape `[batch_size, n_features]`.
    pub inputs: Tensor<B, 2>,
    /// Target loan amounts tensor of shape `[batch_size, 1]`.
    pub targets: Tensor<B, 2>,
}

/// Batcher for creating training batches.
#[derive(Debug, Clone)]
pub struct LoanBatcher<B: Backend> {
    device: B::Device,
    n_features: usize,
}

impl<B: Backend> LoanBatcher<B> {
    /// Creates a new batcher for the given device and feature width.
    #[must_use]
    pub const fn new(device: B::Device, n_features: usize) -> Self {
        Self { device, n_features }
    }

    /// Creates a batch from a vector of items.
    pub fn batch(&self, items: Vec<LoanDatasetItem>) -> LoanBatch<B> {
        let batch_size = items.len();

        let mut features_data = Vec::with_capacity(batch_size * self.n_features);
        let mut targets_data = Vec::with_capacity(batch_size);

        for item in items {
            features_data.extend_from_slice(&item.features);
            targets_data.push(item.target);
        }

        let inputs = Tensor::<B, 1>::from_floats(features_data.as_slice(), &self.device)
            .reshape([batch_size, self.n_features]);

        let targets = Tensor::<B, 1>::from_floats(targets_data.as_slice(), &self.device)
            .reshape([batch_size, 1]);

        LoanBatch { inputs, targets }
    }
}
