//! Builds the flat tabular dataset from joined `(Client, Pret)` rows.

use database::TrainingRow;

use crate::frame::Frame;

/// Flattens joined rows into a frame with one column per declared feature
/// plus the target column. Read-only with respect to the rows.
#[must_use]
pub fn frame_from_rows(rows: &[TrainingRow]) -> Frame {
    let mut frame = Frame::new();

    frame.push_numeric(
        "montant_pret",
        rows.iter().map(|r| r.montant_pret).collect(),
    );
    frame.push_numeric("age", rows.iter().map(|r| Some(f64::from(r.age))).collect());
    frame.push_numeric("taille", rows.iter().map(|r| Some(r.taille)).collect());
    frame.push_numeric("poids", rows.iter().map(|r| Some(r.poids)).collect());
    frame.push_numeric(
        "historique_credits",
        rows.iter().map(|r| r.historique_credits).collect(),
    );
    frame.push_numeric(
        "risque_personnel_client",
        rows.iter().map(|r| r.risque_personnel_client).collect(),
    );
    frame.push_numeric(
        "score_credit_client",
        rows.iter().map(|r| r.score_credit_client).collect(),
    );
    frame.push_numeric(
        "revenu_estime_mois",
        rows.iter()
            .map(|r| Some(f64::from(r.revenu_estime_mois)))
            .collect(),
    );
    frame.push_numeric(
        "loyer_mensuel",
        rows.iter().map(|r| r.loyer_mensuel).collect(),
    );
    frame.push_numeric(
        "score_credit_pret",
        rows.iter().map(|r| r.score_credit_pret).collect(),
    );
    frame.push_numeric(
        "risque_personnel_pret",
        rows.iter().map(|r| r.risque_personnel_pret).collect(),
    );
    frame.push_numeric(
        "nb_enfants",
        rows.iter()
            .map(|r| r.nb_enfants.map(f64::from))
            .collect(),
    );
    frame.push_numeric(
        "quotient_caf",
        rows.iter().map(|r| r.quotient_caf).collect(),
    );

    frame.push_categorical(
        "sport_licence",
        rows.iter().map(|r| Some(r.sport_licence.clone())).collect(),
    );
    frame.push_categorical(
        "smoker",
        rows.iter().map(|r| Some(r.smoker.clone())).collect(),
    );
    frame.push_categorical(
        "niveau_etude",
        rows.iter().map(|r| Some(r.niveau_etude.clone())).collect(),
    );
    frame.push_categorical(
        "region",
        rows.iter().map(|r| Some(r.region.clone())).collect(),
    );
    frame.push_categorical(
        "situation_familiale",
        rows.iter().map(|r| r.situation_familiale.clone()).collect(),
    );

    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_row_per_joined_pair() {
        let rows = vec![
            TrainingRow {
                montant_pret: Some(12_000.0),
                age: 40,
                revenu_estime_mois: 2100,
                sport_licence: "non".to_string(),
                smoker: "oui".to_string(),
                niveau_etude: "bac".to_string(),
                region: "Occitanie".to_string(),
                ..TrainingRow::default()
            },
            TrainingRow {
                montant_pret: None,
                age: 25,
                revenu_estime_mois: 1600,
                sport_licence: "oui".to_string(),
                smoker: "non".to_string(),
                niveau_etude: "bac+2".to_string(),
                region: "Bretagne".to_string(),
                ..TrainingRow::default()
            },
        ];

        let frame = frame_from_rows(&rows);

        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.n_columns(), 18);
        assert_eq!(
            frame.numeric("montant_pret"),
            Some(&[Some(12_000.0), None][..])
        );
        assert_eq!(frame.numeric("age"), Some(&[Some(40.0), Some(25.0)][..]));
        assert_eq!(
            frame.categorical("region"),
            Some(&[Some("Occitanie".to_string()), Some("Bretagne".to_string())][..])
        );
        // Optional fields come through with their missingness preserved.
        assert_eq!(frame.numeric("quotient_caf"), Some(&[None, None][..]));
    }

    #[test]
    fn empty_input_yields_empty_frame() {
        let frame = frame_from_rows(&[]);
        assert_eq!(frame.n_rows(), 0);
        assert_eq!(frame.n_columns(), 18);
    }
}
