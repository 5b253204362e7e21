//! ML model crate for loan amount prediction.
//!
//! This crate uses the Burn deep learning framework to define, train,
//! and run inference with a feed-forward network that predicts a loan
//! amount from the preprocessed applicant feature matrix.

use std::path::Path;

use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::record::CompactRecorder;
use preprocessing::Matrix;
use serde::{Deserialize, Serialize};

mod dataset;
mod evaluate;
mod training;

pub use dataset::{LoanBatcher, LoanDataset, LoanDatasetItem};
pub use evaluate::{RegressionMetrics, evaluate_performance};
pub use training::{TrainingOutput, train};

/// Configuration for the loan amount model.
///
/// The input width depends on the fitted transformer, so it travels with
/// every checkpoint as a JSON sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of input features produced by the preprocessing transformer.
    pub input_dim: usize,
    /// Number of hidden units in the first layer.
    pub hidden_size_1: usize,
    /// Number of hidden units in the second layer.
    pub hidden_size_2: usize,
}

impl ModelConfig {
    /// Creates a configuration for the given feature width with default
    /// hidden sizes.
    #[must_use]
    pub const fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            hidden_size_1: 64,
            hidden_size_2: 32,
        }
    }
}

/// Configuration for training the model.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Learning rate for the optimizer.
    pub learning_rate: f64,
    /// Number of training epochs.
    pub epochs: usize,
    /// Batch size for training.
    pub batch_size: usize,
    /// Model architecture configuration.
    pub model: ModelConfig,
}

impl TrainingConfig {
    /// Creates a training configuration with default hyperparameters.
    #[must_use]
    pub const fn new(model: ModelConfig) -> Self {
        Self {
            learning_rate: 1e-3,
            epochs: 100,
            batch_size: 32,
            model,
        }
    }

    #[must_use]
    pub const fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub const fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }
}

/// The loan amount prediction model.
///
/// A simple feed-forward network taking one preprocessed feature row as
/// input and outputting a predicted loan amount.
#[derive(Module, Debug)]
pub struct LoanModel<B: Backend> {
    linear1: Linear<B>,
    linear2: Linear<B>,
    linear_out: Linear<B>,
    activation: Relu,
}

impl<B: Backend> LoanModel<B> {
    /// Creates a new model with the given configuration.
    pub fn new(device: &B::Device, config: &ModelConfig) -> Self {
        let linear1 = LinearConfig::new(config.input_dim, config.hidden_size_1).init(device);
        let linear2 = LinearConfig::new(config.hidden_size_1, config.hidden_size_2).init(device);
        let linear_out = LinearConfig::new(config.hidden_size_2, 1).init(device);
        let activation = Relu::new();

        Self {
            linear1,
            linear2,
            linear_out,
            activation,
        }
    }

    /// Forward pass through the network.
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor of shape [`batch_size`, `input_dim`]
    ///
    /// # Returns
    ///
    /// Tensor of shape [`batch_size`, 1] containing predicted loan amounts.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.linear1.forward(input);
        let x = self.activation.forward(x);
        let x = self.linear2.forward(x);
        let x = self.activation.forward(x);
        self.linear_out.forward(x)
    }
}

/// Creates a new model with the given configuration.
pub fn create_model<B: Backend>(device: &B::Device, config: &ModelConfig) -> LoanModel<B> {
    LoanModel::new(device, config)
}

/// Predicts loan amounts for every row of a preprocessed feature matrix.
///
/// Row order is preserved.
///
/// # Errors
///
/// Returns an error if the output tensor cannot be read back.
pub fn predict_batch<B: Backend>(
    model: &LoanModel<B>,
    features: &Matrix,
    device: &B::Device,
) -> anyhow::Result<Vec<f32>> {
    if features.n_rows() == 0 {
        return Ok(Vec::new());
    }

    let data: Vec<f32> = features.rows().flatten().map(|&v| v as f32).collect();
    let input = Tensor::<B, 1>::from_floats(data.as_slice(), device)
        .reshape([features.n_rows(), features.n_cols()]);

    let output = model.forward(input);

    output
        .into_data()
        .to_vec()
        .map_err(|e| anyhow::anyhow!("Failed to read predictions from tensor: {e:?}"))
}

/// Predicts the loan amount for a single preprocessed feature row.
///
/// # Errors
///
/// Returns an error if the output tensor cannot be read back.
pub fn predict<B: Backend>(
    model: &LoanModel<B>,
    features: &[f32],
    device: &B::Device,
) -> anyhow::Result<f32> {
    let input = Tensor::<B, 1>::from_floats(features, device).unsqueeze();
    let output = model.forward(input);

    let values: Vec<f32> = output
        .into_data()
        .to_vec()
        .map_err(|e| anyhow::anyhow!("Failed to read prediction from tensor: {e:?}"))?;

    values
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Model produced an empty prediction tensor"))
}

/// Saves the model weights to disk using Burn's record system.
///
/// The recorder appends its own `.mpk` extension to `path`.
///
/// # Errors
///
/// Returns an error if writing the checkpoint fails.
pub fn save_checkpoint<B: Backend>(model: &LoanModel<B>, path: &Path) -> anyhow::Result<()> {
    model
        .clone()
        .save_file(path.to_path_buf(), &CompactRecorder::new())?;
    Ok(())
}

/// Loads model weights from a checkpoint written by [`save_checkpoint`].
///
/// The configuration must describe the same architecture the checkpoint was
/// trained with.
///
/// # Errors
///
/// Returns an error if reading the checkpoint fails or the shapes do not
/// match the configuration.
pub fn load_checkpoint<B: Backend>(
    path: &Path,
    device: &B::Device,
    config: &ModelConfig,
) -> anyhow::Result<LoanModel<B>> {
    let model = LoanModel::new(device, config).load_file(
        path.to_path_buf(),
        &CompactRecorder::new(),
        device,
    )?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;

    use super::*;

    type TestBackend = NdArray;

    #[test]
    fn test_model_creation_and_forward() {
        let device = NdArrayDevice::default();
        let config = ModelConfig::new(7);
        let model: LoanModel<TestBackend> = create_model(&device, &config);

        let input = Tensor::<TestBackend, 2>::zeros([3, 7], &device);
        let output = model.forward(input);
        assert_eq!(output.dims(), [3, 1]);
    }

    #[test]
    fn test_predict_batch_row_count() {
        let device = NdArrayDevice::default();
        let config = ModelConfig::new(2);
        let model: LoanModel<TestBackend> = create_model(&device, &config);

        let features = Matrix::from_flat(vec![0.5, -0.5, 1.0, 0.0, -1.0, 2.0], 3, 2);
        let predictions =
            predict_batch(&model, &features, &device).expect("predictions should be readable");
        assert_eq!(predictions.len(), 3);

        let empty = Matrix::from_flat(Vec::new(), 0, 2);
        let none = predict_batch(&model, &empty, &device).expect("empty input is not an error");
        assert!(none.is_empty());
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let device = NdArrayDevice::default();
        let config = ModelConfig::new(4);
        let model: LoanModel<TestBackend> = create_model(&device, &config);

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("model");

        save_checkpoint(&model, &path).expect("save should succeed");
        let restored: LoanModel<TestBackend> =
            load_checkpoint(&path, &device, &config).expect("load should succeed");

        let features = [0.1, 0.2, 0.3, 0.4];
        let before = predict(&model, &features, &device).expect("prediction should succeed");
        let after = predict(&restored, &features, &device).expect("prediction should succeed");
        assert!((before - after).abs() < 1e-6);
    }

    #[test]
    fn test_training_config_defaults() {
        let config = TrainingConfig::new(ModelConfig::new(10))
            .with_epochs(5)
            .with_batch_size(8);
        assert!(config.learning_rate > 0.0);
        assert_eq!(config.epochs, 5);
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.model.input_dim, 10);
    }
}
