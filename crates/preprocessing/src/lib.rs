//! Preprocessing pipeline for the loan amount regression model.
//!
//! Turns joined `(Client, Pret)` rows into a clean numeric feature matrix:
//! business-rule correction, target-null row filtering, sparse-column
//! pruning, IQR outlier clipping, then a fitted impute/encode/scale
//! transformer. The pipeline is synchronous and stateless between
//! invocations; the only carried state is the returned [`FittedTransformer`].

use tracing::debug;

mod extract;
mod frame;
mod matrix;
mod outliers;
mod prune;
mod rules;
mod split;
mod transform;

pub use extract::frame_from_rows;
pub use frame::{Column, Frame};
pub use matrix::Matrix;
pub use outliers::clip_outliers_iqr;
pub use prune::{drop_sparse_columns, extract_target};
pub use rules::correct_business_rules;
pub use split::{DEFAULT_SEED, DEFAULT_TEST_SIZE, train_test_split};
pub use transform::FittedTransformer;

/// Name of the prediction target column.
pub const TARGET_COLUMN: &str = "montant_pret";

/// Columns whose missing-value ratio above this threshold gets them dropped.
pub const MISSING_RATIO_THRESHOLD: f64 = 0.40;

/// Candidate numeric feature columns, in matrix order.
pub const NUMERIC_COLUMNS: [&str; 12] = [
    "age",
    "taille",
    "poids",
    "historique_credits",
    "risque_personnel_client",
    "score_credit_client",
    "revenu_estime_mois",
    "loyer_mensuel",
    "score_credit_pret",
    "risque_personnel_pret",
    "nb_enfants",
    "quotient_caf",
];

/// Candidate categorical feature columns, in matrix order.
pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    "sport_licence",
    "smoker",
    "niveau_etude",
    "region",
    "situation_familiale",
];

/// Errors produced by the preprocessing pipeline.
///
/// Local data-shape issues (missing values, absent optional columns, unseen
/// categories) are handled inline and never reach this enum.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("target column `{0}` is not present as a numeric column")]
    MissingTargetColumn(String),

    #[error("dataset is empty after dropping rows without a target value")]
    EmptyDataset,

    #[error("feature matrix has {x_rows} rows but target vector has {y_len} values")]
    ShapeMismatch { x_rows: usize, y_len: usize },

    #[error("test fraction {test_size} leaves an empty train or test partition for {n_rows} rows")]
    InvalidTestSize { test_size: f64, n_rows: usize },
}

/// Runs the full preprocessing pipeline on a raw frame.
///
/// Stages, in order: business-rule correction, target-null row drop (the
/// target vector is extracted here), sparse-column pruning, IQR outlier
/// clipping, transformer fitting and application.
///
/// Returns the feature matrix, the target vector and the fitted transformer
/// to be reused verbatim at inference time.
///
/// # Errors
///
/// Returns an error if the target column is missing or no labeled rows
/// remain.
pub fn preprocess(
    mut frame: Frame,
    target: &str,
) -> Result<(Matrix, Vec<f64>, FittedTransformer), PreprocessError> {
    let columns_before = frame.n_columns();

    correct_business_rules(&mut frame);

    let y = extract_target(&mut frame, target)?;
    if frame.is_empty() {
        return Err(PreprocessError::EmptyDataset);
    }

    let dropped = drop_sparse_columns(&mut frame, MISSING_RATIO_THRESHOLD);
    debug!(
        columns_before,
        columns_after = frame.n_columns(),
        dropped = ?dropped,
        "Pruned sparse columns"
    );

    clip_outliers_iqr(&mut frame, &NUMERIC_COLUMNS);

    let transformer = FittedTransformer::fit(&frame, &NUMERIC_COLUMNS, &CATEGORICAL_COLUMNS)?;
    let x = transformer.transform(&frame);

    debug!(
        rows = x.n_rows(),
        features = x.n_cols(),
        "Preprocessing complete"
    );

    Ok((x, y, transformer))
}

#[cfg(test)]
mod tests {
    use database::TrainingRow;

    use super::*;

    fn sample_rows() -> Vec<TrainingRow> {
        (0..5)
            .map(|i| TrainingRow {
                // One row has no target value.
                montant_pret: if i == 2 { None } else { Some(8_000.0 + 1_000.0 * f64::from(i)) },
                age: 25 + i,
                taille: 170.0 + f64::from(i),
                poids: 70.0 + f64::from(i),
                historique_credits: Some(1.0),
                risque_personnel_client: Some(0.2),
                score_credit_client: Some(0.7),
                revenu_estime_mois: 1800 + 100 * i,
                loyer_mensuel: Some(600.0),
                score_credit_pret: Some(0.6),
                risque_personnel_pret: Some(0.3),
                sport_licence: if i % 2 == 0 { "oui" } else { "non" }.to_string(),
                smoker: "non".to_string(),
                niveau_etude: "bac".to_string(),
                region: "Occitanie".to_string(),
                situation_familiale: Some("célibataire".to_string()),
                nb_enfants: Some(i - 1),
                quotient_caf: None,
            })
            .collect()
    }

    #[test]
    fn unlabeled_rows_are_dropped_end_to_end() {
        let frame = frame_from_rows(&sample_rows());

        let (x, y, _) = preprocess(frame, TARGET_COLUMN).unwrap();

        assert_eq!(x.n_rows(), 4);
        assert_eq!(y.len(), 4);
    }

    #[test]
    fn fully_missing_column_is_pruned_before_fitting() {
        let frame = frame_from_rows(&sample_rows());

        let (_, _, transformer) = preprocess(frame, TARGET_COLUMN).unwrap();

        // quotient_caf is missing everywhere (ratio 1.0 > 0.40), so it never
        // reaches the transformer.
        assert!(
            !transformer
                .feature_names()
                .iter()
                .any(|name| name == "quotient_caf")
        );
    }

    #[test]
    fn business_rules_apply_before_fitting() {
        let rows = sample_rows();
        let frame = frame_from_rows(&rows);

        // nb_enfants was seeded with -1 for the first row; after the
        // corrector the transformed cell equals the one for a genuine zero.
        let (x, _, transformer) = preprocess(frame, TARGET_COLUMN).unwrap();

        let names = transformer.feature_names();
        let col = names
            .iter()
            .position(|name| name == "nb_enfants")
            .expect("nb_enfants should survive pruning");

        // Clamped value standardizes identically to a true zero: the first
        // two surviving rows had nb_enfants -1 (clamped to 0) and 0.
        assert_eq!(x.row(0)[col], x.row(1)[col]);
    }

    #[test]
    fn missing_target_column_is_an_error() {
        let mut frame = Frame::new();
        frame.push_numeric("age", vec![Some(30.0)]);

        let err = preprocess(frame, TARGET_COLUMN).unwrap_err();
        assert!(matches!(err, PreprocessError::MissingTargetColumn(_)));
    }

    #[test]
    fn all_targets_missing_is_an_error() {
        let mut rows = sample_rows();
        for row in &mut rows {
            row.montant_pret = None;
        }

        let err = preprocess(frame_from_rows(&rows), TARGET_COLUMN).unwrap_err();
        assert!(matches!(err, PreprocessError::EmptyDataset));
    }

    #[test]
    fn transformer_reapplies_identically_at_inference() {
        let rows = sample_rows();
        let frame = frame_from_rows(&rows);

        let (x, _, transformer) = preprocess(frame, TARGET_COLUMN).unwrap();

        // Rebuild the inference-side frame the way the prediction path does:
        // same rows, no clipping or pruning happened on the training matrix
        // that the frozen transformer would not reproduce.
        let labeled: Vec<TrainingRow> = rows
            .into_iter()
            .filter(|row| row.montant_pret.is_some())
            .collect();
        let mut inference_frame = frame_from_rows(&labeled);
        correct_business_rules(&mut inference_frame);
        clip_outliers_iqr(&mut inference_frame, &NUMERIC_COLUMNS);

        let reapplied = transformer.transform(&inference_frame);
        assert_eq!(reapplied.n_cols(), x.n_cols());
        assert_eq!(reapplied.n_rows(), x.n_rows());
    }
}
