//! Train command - runs the full pipeline as a tracked run.

use anyhow::{Context, Result};
use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use bytes::Bytes;
use database::ClientRepository;
use ml_model::{
    LoanDataset, ModelConfig, TrainingConfig, create_model, evaluate_performance, predict_batch,
    save_checkpoint, train,
};
use preprocessing::{TARGET_COLUMN, frame_from_rows, preprocess, train_test_split};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::figures::loss_curve_svg;
use tracking::{RunRepository, store_artifact};

type Backend = Autodiff<NdArray>;

/// Artifact name of the serialized fitted transformer.
pub const TRANSFORMER_ARTIFACT: &str = "preprocessor.json";
/// Artifact name of the model weights checkpoint.
pub const MODEL_ARTIFACT: &str = "model.mpk";
/// Artifact name of the model architecture sidecar.
pub const MODEL_CONFIG_ARTIFACT: &str = "model_config.json";
/// Artifact name of the loss-curve figure.
pub const FIGURE_ARTIFACT: &str = "loss_curve.svg";

/// Runs the train command.
///
/// Opens a tracked run, executes the pipeline against it and closes the run
/// as finished. Any failure marks the run failed and propagates.
///
/// # Errors
///
/// Returns an error if the pipeline, training or tracking fails.
pub async fn run(
    pool: &PgPool,
    name: &str,
    epochs: usize,
    batch_size: usize,
    learning_rate: f64,
    test_size: f64,
    seed: u64,
) -> Result<()> {
    let run = RunRepository::start(pool, name).await?;
    info!(run_id = %run.id, name, "Started training run");

    match execute(pool, run.id, epochs, batch_size, learning_rate, test_size, seed).await {
        Ok(()) => {
            RunRepository::finish(pool, run.id).await?;
            info!(run_id = %run.id, "Training run finished");
            Ok(())
        }
        Err(e) => {
            error!(run_id = %run.id, error = %e, "Training run failed");
            RunRepository::fail(pool, run.id).await?;
            Err(e)
        }
    }
}

#[allow(clippy::too_many_lines)]
async fn execute(
    pool: &PgPool,
    run_id: Uuid,
    epochs: usize,
    batch_size: usize,
    learning_rate: f64,
    test_size: f64,
    seed: u64,
) -> Result<()> {
    info!("Loading training data");
    let rows = ClientRepository::training_rows(pool).await?;
    if rows.is_empty() {
        anyhow::bail!("No training data found. Please import records first.");
    }
    info!(rows = rows.len(), "Loaded joined records");

    let frame = frame_from_rows(&rows);
    let (x, y, transformer) = preprocess(frame, TARGET_COLUMN)?;
    let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, test_size, seed)?;

    info!(
        train_rows = x_train.n_rows(),
        test_rows = x_test.n_rows(),
        features = x.n_cols(),
        "Preprocessing complete"
    );

    let model_config = ModelConfig::new(transformer.output_width());
    let training_config = TrainingConfig::new(model_config.clone())
        .with_epochs(epochs)
        .with_batch_size(batch_size)
        .with_learning_rate(learning_rate);

    let device = NdArrayDevice::default();
    let mut model = create_model::<Backend>(&device, &model_config);

    let train_set = LoanDataset::from_matrix(&x_train, &y_train);
    let valid_set = LoanDataset::from_matrix(&x_test, &y_test);

    info!(epochs, batch_size, learning_rate, "Training model");
    let output = train(&mut model, &train_set, Some(&valid_set), &training_config)?;

    // Evaluate on the held-out partition with the inference-mode model.
    let inference_model = model.valid();
    let predictions = predict_batch(&inference_model, &x_test, &device)?;
    let metrics = evaluate_performance(&y_test, &predictions);

    info!(
        mse = metrics.mse,
        mae = metrics.mae,
        r2 = metrics.r2,
        epochs_completed = output.epochs_completed,
        "Evaluation complete"
    );

    RunRepository::log_metric(pool, run_id, "mse", metrics.mse).await?;
    RunRepository::log_metric(pool, run_id, "mae", metrics.mae).await?;
    RunRepository::log_metric(pool, run_id, "r2", metrics.r2).await?;
    RunRepository::log_metric(
        pool,
        run_id,
        "final_train_loss",
        f64::from(output.final_train_loss),
    )
    .await?;

    RunRepository::log_param(pool, run_id, "epochs", &epochs.to_string()).await?;
    RunRepository::log_param(pool, run_id, "batch_size", &batch_size.to_string()).await?;
    RunRepository::log_param(pool, run_id, "learning_rate", &learning_rate.to_string()).await?;
    RunRepository::log_param(pool, run_id, "test_size", &test_size.to_string()).await?;
    RunRepository::log_param(pool, run_id, "seed", &seed.to_string()).await?;
    RunRepository::log_param(
        pool,
        run_id,
        "n_features",
        &transformer.output_width().to_string(),
    )
    .await?;
    RunRepository::log_param(pool, run_id, "n_rows", &x.n_rows().to_string()).await?;

    // Publish artifacts under this run's own namespace.
    let transformer_json =
        serde_json::to_vec(&transformer).context("Failed to serialize transformer")?;
    store_artifact(pool, run_id, TRANSFORMER_ARTIFACT, Bytes::from(transformer_json)).await?;

    let config_json =
        serde_json::to_vec(&model_config).context("Failed to serialize model config")?;
    store_artifact(pool, run_id, MODEL_CONFIG_ARTIFACT, Bytes::from(config_json)).await?;

    let checkpoint_dir = tempfile::tempdir().context("Failed to create checkpoint directory")?;
    let checkpoint_path = checkpoint_dir.path().join("model");
    save_checkpoint(&inference_model, &checkpoint_path)?;

    // The recorder appends its own extension.
    let checkpoint_bytes = std::fs::read(checkpoint_dir.path().join("model.mpk"))
        .context("Failed to read checkpoint file")?;
    store_artifact(pool, run_id, MODEL_ARTIFACT, Bytes::from(checkpoint_bytes)).await?;

    let figure = loss_curve_svg(&output.train_loss_history);
    store_artifact(pool, run_id, FIGURE_ARTIFACT, Bytes::from(figure.into_bytes())).await?;

    Ok(())
}
