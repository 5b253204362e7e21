//! Training loop for the loan amount model.

use burn::data::dataset::Dataset;
use burn::nn::loss::MseLoss;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use tracing::info;

use crate::dataset::{LoanBatcher, LoanDataset};
use crate::{LoanModel, TrainingConfig};

const EARLY_STOPPING_PATIENCE: usize = 10;

/// Output from training.
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    /// Final training loss.
    pub final_train_loss: f32,
    /// Final validation loss (if a validation set was provided).
    pub final_valid_loss: Option<f32>,
    /// Number of epochs completed.
    pub epochs_completed: usize,
    /// Mean training loss per completed epoch.
    pub train_loss_history: Vec<f32>,
}

/// Trains the model on the provided dataset.
///
/// Uses a simple training loop with Adam optimizer and MSE loss. When a
/// validation set is given, training stops early after
/// [`EARLY_STOPPING_PATIENCE`] epochs without validation improvement.
///
/// # Errors
///
/// Returns an error if the training set is empty.
pub fn train<B: AutodiffBackend>(
    model: &mut LoanModel<B>,
    train_set: &LoanDataset,
    valid_set: Option<&LoanDataset>,
    config: &TrainingConfig,
) -> anyhow::Result<TrainingOutput> {
    if train_set.is_empty() {
        return Err(anyhow::anyhow!("No training data provided"));
    }

    let device = model.linear1.weight.device();
    let batcher = LoanBatcher::<B>::new(device, train_set.n_features());

    let mut optimizer = AdamConfig::new().init();
    let loss_fn = MseLoss::new();

    let mut final_train_loss = 0.0;
    let mut final_valid_loss: Option<f32> = None;
    let mut train_loss_history = Vec::with_capacity(config.epochs);
    let mut best_valid_loss = f32::MAX;
    let mut epochs_without_improvement = 0;

    for epoch in 0..config.epochs {
        let mut epoch_loss = 0.0;
        let mut batch_count = 0;

        let num_samples = train_set.len();
        let mut indices: Vec<usize> = (0..num_samples).collect();
        shuffle_indices(&mut indices, epoch as u64);

        for batch_start in (0..num_samples).step_by(config.batch_size) {
            let batch_end = (batch_start + config.batch_size).min(num_samples);
            let Some(batch_indices) = indices.get(batch_start..batch_end) else {
                continue;
            };

            let items: Vec<_> = batch_indices
                .iter()
                .filter_map(|&i| train_set.get(i))
                .collect();

            if items.is_empty() {
                continue;
            }

            let batch = batcher.batch(items);

            let predictions = model.forward(batch.inputs);
            let loss = loss_fn.forward(predictions, batch.targets, burn::nn::loss::Reduction::Mean);

            let loss_value: f32 = loss
                .clone()
                .into_data()
                .to_vec()
                .unwrap_or_else(|_| vec![0.0])
                .first()
                .copied()
                .unwrap_or(0.0);

            epoch_loss += loss_value as f64;
            batch_count += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, model);

            *model = optimizer.step(config.learning_rate, model.clone(), grads);
        }

        final_train_loss = if batch_count > 0 {
            (epoch_loss / batch_count as f64) as f32
        } else {
            0.0
        };
        train_loss_history.push(final_train_loss);

        if let Some(valid_ds) = valid_set {
            let valid_loss = compute_validation_loss(model, valid_ds, &batcher, &loss_fn);
            final_valid_loss = Some(valid_loss);

            if valid_loss < best_valid_loss {
                best_valid_loss = valid_loss;
                epochs_without_improvement = 0;
            } else {
                epochs_without_improvement += 1;
                if epochs_without_improvement >= EARLY_STOPPING_PATIENCE {
                    log_progress(epoch + 1, final_train_loss, final_valid_loss);
                    info!(
                        patience = EARLY_STOPPING_PATIENCE,
                        "Early stopping triggered"
                    );
                    return Ok(TrainingOutput {
                        final_train_loss,
                        final_valid_loss,
                        epochs_completed: epoch + 1,
                        train_loss_history,
                    });
                }
            }
        }

        if epoch % 10 == 0 || epoch == config.epochs - 1 {
            log_progress(epoch + 1, final_train_loss, final_valid_loss);
        }
    }

    Ok(TrainingOutput {
        final_train_loss,
        final_valid_loss,
        epochs_completed: config.epochs,
        train_loss_history,
    })
}

/// Computes the validation loss on a dataset.
fn compute_validation_loss<B: Backend>(
    model: &LoanModel<B>,
    dataset: &LoanDataset,
    batcher: &LoanBatcher<B>,
    loss_fn: &MseLoss,
) -> f32 {
    let num_samples = dataset.len();
    if num_samples == 0 {
        return 0.0;
    }

    let mut total_loss = 0.0;
    let mut batch_count = 0;

    const BATCH_SIZE: usize = 64;
    for batch_start in (0..num_samples).step_by(BATCH_SIZE) {
        let batch_end = (batch_start + BATCH_SIZE).min(num_samples);

        let items: Vec<_> = (batch_start..batch_end)
            .filter_map(|i| dataset.get(i))
            .collect();

        if items.is_empty() {
            continue;
        }

        let batch = batcher.batch(items);
        let predictions = model.forward(batch.inputs);
        let loss = loss_fn.forward(predictions, batch.targets, burn::nn::loss::Reduction::Mean);

        let loss_value: f32 = loss
            .into_data()
            .to_vec()
            .unwrap_or_else(|_| vec![0.0])
            .first()
            .copied()
            .unwrap_or(0.0);

        total_loss += loss_value as f64;
        batch_count += 1;
    }

    if batch_count > 0 {
        (total_loss / batch_count as f64) as f32
    } else {
        0.0
    }
}

/// Shuffles indices using a simple LCG-based Fisher-Yates pass.
fn shuffle_indices(indices: &mut [usize], seed: u64) {
    let mut rng_state = seed.wrapping_add(12345);

    for i in (1..indices.len()).rev() {
        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let j = ((rng_state >> 33) as usize) % (i + 1);
        indices.swap(i, j);
    }
}

fn log_progress(epoch: usize, train_loss: f32, valid_loss: Option<f32>) {
    if let Some(vl) = valid_loss {
        info!(epoch, train_loss, valid_loss = vl, "Training progress");
    } else {
        info!(epoch, train_loss, "Training progress");
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::{Autodiff, NdArray};
    use preprocessing::Matrix;

    use super::*;
    use crate::ModelConfig;

    type TestBackend = Autodiff<NdArray>;

    fn linear_dataset(n: usize) -> LoanDataset {
        // y = 2 * x0 + 3, trivially learnable
        let data: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        let targets: Vec<f64> = data.iter().map(|x| 2.0 * x + 3.0).collect();
        LoanDataset::from_matrix(&Matrix::from_flat(data, n, 1), &targets)
    }

    #[test]
    fn test_training_runs_all_epochs() {
        let device = NdArrayDevice::default();
        let model_config = ModelConfig::new(1);
        let mut model: LoanModel<TestBackend> = LoanModel::new(&device, &model_config);

        let dataset = linear_dataset(64);
        let config = TrainingConfig::new(model_config)
            .with_epochs(3)
            .with_batch_size(16);

        let output = train(&mut model, &dataset, None, &config).expect("training should succeed");

        assert_eq!(output.epochs_completed, 3);
        assert_eq!(output.train_loss_history.len(), 3);
        assert!(output.final_valid_loss.is_none());
    }

    #[test]
    fn test_training_reports_validation_loss() {
        let device = NdArrayDevice::default();
        let model_config = ModelConfig::new(1);
        let mut model: LoanModel<TestBackend> = LoanModel::new(&device, &model_config);

        let train_set = linear_dataset(64);
        let valid_set = linear_dataset(16);
        let config = TrainingConfig::new(model_config)
            .with_epochs(2)
            .with_batch_size(16);

        let output = train(&mut model, &train_set, Some(&valid_set), &config)
            .expect("training should succeed");

        assert!(output.final_valid_loss.is_some());
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let device = NdArrayDevice::default();
        let model_config = ModelConfig::new(1);
        let mut model: LoanModel<TestBackend> = LoanModel::new(&device, &model_config);

        let empty = LoanDataset::from_matrix(&Matrix::from_flat(Vec::new(), 0, 1), &[]);
        let config = TrainingConfig::new(model_config);

        assert!(train(&mut model, &empty, None, &config).is_err());
    }

    #[test]
    fn test_shuffle_indices() {
        let mut indices: Vec<usize> = (0..10).collect();
        let original = indices.clone();

        shuffle_indices(&mut indices, 42);

        assert_ne!(indices, original, "Shuffle should change order");

        indices.sort_unstable();
        assert_eq!(indices, original, "Shuffle should preserve elements");
    }
}
