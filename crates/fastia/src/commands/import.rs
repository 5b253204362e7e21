//! Import command - bulk-loads clients and loan applications from CSV.
//!
//! The source export uses comma decimal separators (`62,5`) and mixes
//! identity columns we deliberately do not persist (name, sex, nationality)
//! with the feature columns we keep.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use database::{ClientRepository, CreateClient, CreatePret, PretRepository};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info};

/// One CSV row, read by header name. Columns not listed here (identity
/// fields) are ignored.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    age: String,
    taille: Option<String>,
    poids: Option<String>,
    sport_licence: String,
    smoker: String,
    niveau_etude: String,
    region: String,
    situation_familiale: Option<String>,
    historique_credits: Option<String>,
    risque_personnel: Option<String>,
    score_credit: Option<String>,
    date_creation_compte: Option<String>,
    nb_enfants: Option<String>,
    quotient_caf: Option<String>,
    montant_pret: Option<String>,
    revenu_estime_mois: String,
    loyer_mensuel: Option<String>,
}

/// Runs the import command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a row cannot be parsed, or
/// a database insert fails.
pub async fn run(pool: &PgPool, file: &Path) -> Result<()> {
    info!(file = %file.display(), "Importing CSV");

    let mut reader = csv::Reader::from_path(file)
        .with_context(|| format!("Failed to open CSV file {}", file.display()))?;

    let mut imported = 0usize;
    for (index, record) in reader.deserialize::<CsvRecord>().enumerate() {
        let record = record.with_context(|| format!("Failed to parse CSV row {}", index + 1))?;
        import_record(pool, &record)
            .await
            .with_context(|| format!("Failed to import CSV row {}", index + 1))?;

        imported += 1;
        debug!(row = index + 1, "Imported row");
    }

    info!(imported, "Import complete");
    Ok(())
}

async fn import_record(pool: &PgPool, record: &CsvRecord) -> Result<()> {
    let client = ClientRepository::create(
        pool,
        CreateClient {
            age: record.age.trim().parse().context("invalid age")?,
            taille: parse_required_float(record.taille.as_deref(), "taille")?,
            poids: parse_required_float(record.poids.as_deref(), "poids")?,
            sport_licence: record.sport_licence.clone(),
            smoker: record.smoker.clone(),
            niveau_etude: record.niveau_etude.clone(),
            region: record.region.clone(),
            situation_familiale: non_empty(record.situation_familiale.as_deref()),
            historique_credits: parse_comma_float(record.historique_credits.as_deref())?,
            risque_personnel: parse_comma_float(record.risque_personnel.as_deref())?,
            score_credit: parse_comma_float(record.score_credit.as_deref())?,
            date_creation_compte: parse_date(record.date_creation_compte.as_deref())?,
            nb_enfants: parse_int(record.nb_enfants.as_deref())?,
            quotient_caf: parse_comma_float(record.quotient_caf.as_deref())?,
        },
    )
    .await?;

    PretRepository::create(
        pool,
        CreatePret {
            client_id: client.id,
            montant_pret: parse_comma_float(record.montant_pret.as_deref())?,
            revenu_estime_mois: record
                .revenu_estime_mois
                .trim()
                .parse()
                .context("invalid revenu_estime_mois")?,
            loyer_mensuel: parse_comma_float(record.loyer_mensuel.as_deref())?,
            score_credit: parse_comma_float(record.score_credit.as_deref())?,
            risque_personnel: parse_comma_float(record.risque_personnel.as_deref())?,
        },
    )
    .await?;

    Ok(())
}

/// Parses a float written with either a comma or a dot decimal separator.
/// Empty or absent cells become `None`.
fn parse_comma_float(raw: Option<&str>) -> Result<Option<f64>> {
    let Some(value) = non_empty(raw) else {
        return Ok(None);
    };

    let normalized = value.replace(',', ".");
    let parsed = normalized
        .parse()
        .with_context(|| format!("invalid float value `{value}`"))?;
    Ok(Some(parsed))
}

fn parse_required_float(raw: Option<&str>, column: &str) -> Result<f64> {
    parse_comma_float(raw)?.with_context(|| format!("missing required column `{column}`"))
}

fn parse_int(raw: Option<&str>) -> Result<Option<i32>> {
    let Some(value) = non_empty(raw) else {
        return Ok(None);
    };

    let parsed = value
        .parse()
        .with_context(|| format!("invalid integer value `{value}`"))?;
    Ok(Some(parsed))
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(value) = non_empty(raw) else {
        return Ok(None);
    };

    let parsed = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .with_context(|| format!("invalid date value `{value}`"))?;
    Ok(Some(parsed))
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_decimals_are_normalized() {
        assert_eq!(parse_comma_float(Some("62,5")).unwrap(), Some(62.5));
        assert_eq!(parse_comma_float(Some("62.5")).unwrap(), Some(62.5));
        assert_eq!(parse_comma_float(Some(" 1800 ")).unwrap(), Some(1800.0));
    }

    #[test]
    fn empty_cells_become_none() {
        assert_eq!(parse_comma_float(None).unwrap(), None);
        assert_eq!(parse_comma_float(Some("")).unwrap(), None);
        assert_eq!(parse_comma_float(Some("   ")).unwrap(), None);
        assert_eq!(parse_date(Some("")).unwrap(), None);
        assert_eq!(parse_int(Some("")).unwrap(), None);
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(parse_comma_float(Some("abc")).is_err());
        assert!(parse_date(Some("2020/01/01")).is_err());
        assert!(parse_int(Some("2.5")).is_err());
    }

    #[test]
    fn dates_parse_iso_format() {
        let date = parse_date(Some("2021-06-15")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2021, 6, 15));
    }
}
