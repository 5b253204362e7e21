//! Predict command - scores one applicant with the latest published model.
//!
//! The fitted transformer, model config and checkpoint are loaded once and
//! passed around as explicit handles.

use std::path::Path;

use anyhow::{Context, Result};
use burn::backend::NdArray;
use burn::backend::ndarray::NdArrayDevice;
use ml_model::{LoanModel, ModelConfig, load_checkpoint, predict_batch};
use preprocessing::{FittedTransformer, Frame, correct_business_rules};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::train::{MODEL_ARTIFACT, MODEL_CONFIG_ARTIFACT, TRANSFORMER_ARTIFACT};
use tracking::{RunRepository, fetch_artifact};

type Backend = NdArray;

/// One applicant, as submitted for scoring. Every feature is optional; the
/// fitted transformer imputes whatever is missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PredictInput {
    pub age: Option<f64>,
    pub taille: Option<f64>,
    pub poids: Option<f64>,
    pub historique_credits: Option<f64>,
    pub risque_personnel_client: Option<f64>,
    pub score_credit_client: Option<f64>,
    pub revenu_estime_mois: Option<f64>,
    pub loyer_mensuel: Option<f64>,
    pub score_credit_pret: Option<f64>,
    pub risque_personnel_pret: Option<f64>,
    pub nb_enfants: Option<f64>,
    pub quotient_caf: Option<f64>,
    pub sport_licence: Option<String>,
    pub smoker: Option<String>,
    pub niveau_etude: Option<String>,
    pub region: Option<String>,
    pub situation_familiale: Option<String>,
}

/// Runs the predict command.
///
/// # Errors
///
/// Returns an error if no finished run exists, an artifact is missing, or
/// the input file cannot be read.
pub async fn run(pool: &PgPool, input: &Path, run_id: Option<Uuid>) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;
    let applicant: PredictInput =
        serde_json::from_str(&raw).context("Failed to parse applicant JSON")?;

    let run = match run_id {
        Some(id) => RunRepository::find_by_id(pool, id)
            .await?
            .with_context(|| format!("No run with id {id}"))?,
        None => RunRepository::latest_finished(pool)
            .await?
            .context("No finished training run found. Train a model first.")?,
    };
    info!(run_id = %run.id, run_name = %run.name, "Resolved model run");

    let (transformer, model, device) = load_run_artifacts(pool, run.id).await?;

    let mut frame = applicant_frame(&applicant);
    correct_business_rules(&mut frame);

    let features = transformer.transform(&frame);
    let predictions = predict_batch(&model, &features, &device)?;
    let montant = predictions
        .first()
        .copied()
        .context("Model produced no prediction")?;

    info!(montant_pret = montant, "Prediction complete");
    println!("{}", serde_json::json!({ "montant_pret": montant }));

    Ok(())
}

/// Loads the transformer, model config and checkpoint published by a run.
async fn load_run_artifacts(
    pool: &PgPool,
    run_id: Uuid,
) -> Result<(FittedTransformer, LoanModel<Backend>, NdArrayDevice)> {
    let transformer_json = fetch_artifact(pool, run_id, TRANSFORMER_ARTIFACT).await?;
    let transformer: FittedTransformer =
        serde_json::from_slice(&transformer_json).context("Failed to parse transformer")?;

    let config_json = fetch_artifact(pool, run_id, MODEL_CONFIG_ARTIFACT).await?;
    let model_config: ModelConfig =
        serde_json::from_slice(&config_json).context("Failed to parse model config")?;

    let checkpoint = fetch_artifact(pool, run_id, MODEL_ARTIFACT).await?;
    let checkpoint_dir = tempfile::tempdir().context("Failed to create checkpoint directory")?;
    std::fs::write(checkpoint_dir.path().join("model.mpk"), &checkpoint)
        .context("Failed to write checkpoint file")?;

    let device = NdArrayDevice::default();
    let model = load_checkpoint::<Backend>(
        &checkpoint_dir.path().join("model"),
        &device,
        &model_config,
    )?;

    Ok((transformer, model, device))
}

/// Builds a single-row frame from the applicant, named to match the fitted
/// training columns.
fn applicant_frame(input: &PredictInput) -> Frame {
    let mut frame = Frame::new();

    frame.push_numeric("age", vec![input.age]);
    frame.push_numeric("taille", vec![input.taille]);
    frame.push_numeric("poids", vec![input.poids]);
    frame.push_numeric("historique_credits", vec![input.historique_credits]);
    frame.push_numeric(
        "risque_personnel_client",
        vec![input.risque_personnel_client],
    );
    frame.push_numeric("score_credit_client", vec![input.score_credit_client]);
    frame.push_numeric("revenu_estime_mois", vec![input.revenu_estime_mois]);
    frame.push_numeric("loyer_mensuel", vec![input.loyer_mensuel]);
    frame.push_numeric("score_credit_pret", vec![input.score_credit_pret]);
    frame.push_numeric("risque_personnel_pret", vec![input.risque_personnel_pret]);
    frame.push_numeric("nb_enfants", vec![input.nb_enfants]);
    frame.push_numeric("quotient_caf", vec![input.quotient_caf]);

    frame.push_categorical("sport_licence", vec![input.sport_licence.clone()]);
    frame.push_categorical("smoker", vec![input.smoker.clone()]);
    frame.push_categorical("niveau_etude", vec![input.niveau_etude.clone()]);
    frame.push_categorical("region", vec![input.region.clone()]);
    frame.push_categorical(
        "situation_familiale",
        vec![input.situation_familiale.clone()],
    );

    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applicant_frame_has_one_row_per_column() {
        let input = PredictInput {
            age: Some(30.0),
            smoker: Some("non".to_string()),
            ..PredictInput::default()
        };

        let frame = applicant_frame(&input);

        assert_eq!(frame.n_rows(), 1);
        assert_eq!(frame.n_columns(), 17);
        assert!(frame.contains("age"));
        assert!(frame.contains("situation_familiale"));
        assert!(!frame.contains("montant_pret"));
    }

    #[test]
    fn missing_fields_deserialize_to_none() {
        let applicant: PredictInput =
            serde_json::from_str(r#"{"age": 42, "region": "Bretagne"}"#).unwrap();

        assert_eq!(applicant.age, Some(42.0));
        assert_eq!(applicant.region.as_deref(), Some("Bretagne"));
        assert!(applicant.taille.is_none());
        assert!(applicant.smoker.is_none());
    }

    #[test]
    fn negative_business_rule_fields_are_corrected() {
        let input = PredictInput {
            nb_enfants: Some(-2.0),
            quotient_caf: Some(-100.0),
            ..PredictInput::default()
        };

        let mut frame = applicant_frame(&input);
        correct_business_rules(&mut frame);

        let nb_enfants = frame.numeric("nb_enfants").unwrap();
        let quotient_caf = frame.numeric("quotient_caf").unwrap();
        assert_eq!(nb_enfants[0], Some(0.0));
        assert_eq!(quotient_caf[0], Some(0.0));
    }
}
