//! Database model types.

use sqlx::types::chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A loan applicant profile stored in the database.
///
/// Identity fields (name, sex, nationality) are deliberately not persisted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Client {
    pub id: Uuid,
    pub age: i32,
    pub taille: f64,
    pub poids: f64,
    /// Sport-license flag, string-encoded ("oui" / "non").
    pub sport_licence: String,
    /// Smoker flag, string-encoded ("oui" / "non").
    pub smoker: String,
    pub niveau_etude: String,
    pub region: String,
    pub situation_familiale: Option<String>,
    pub historique_credits: Option<f64>,
    pub risque_personnel: Option<f64>,
    pub score_credit: Option<f64>,
    pub date_creation_compte: Option<NaiveDate>,
    pub nb_enfants: Option<i32>,
    pub quotient_caf: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A loan application tied to exactly one client.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Pret {
    pub id: Uuid,
    pub client_id: Uuid,
    /// Loan amount, the prediction target. Nullable in the store.
    pub montant_pret: Option<f64>,
    /// Estimated monthly income at the time of the request.
    pub revenu_estime_mois: i32,
    pub loyer_mensuel: Option<f64>,
    pub score_credit: Option<f64>,
    pub risque_personnel: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a client record.
#[derive(Debug, Clone, Default)]
pub struct CreateClient {
    pub age: i32,
    pub taille: f64,
    pub poids: f64,
    pub sport_licence: String,
    pub smoker: String,
    pub niveau_etude: String,
    pub region: String,
    pub situation_familiale: Option<String>,
    pub historique_credits: Option<f64>,
    pub risque_personnel: Option<f64>,
    pub score_credit: Option<f64>,
    pub date_creation_compte: Option<NaiveDate>,
    pub nb_enfants: Option<i32>,
    pub quotient_caf: Option<f64>,
}

/// Input for creating or replacing a loan application record.
#[derive(Debug, Clone)]
pub struct CreatePret {
    pub client_id: Uuid,
    pub montant_pret: Option<f64>,
    pub revenu_estime_mois: i32,
    pub loyer_mensuel: Option<f64>,
    pub score_credit: Option<f64>,
    pub risque_personnel: Option<f64>,
}

/// The flattened inner join of one `Client` and one `Pret`.
///
/// Ephemeral: derived fresh for every training invocation, never persisted.
/// Scores present on both entities are disambiguated with `_client` / `_pret`
/// suffixes, matching the pipeline's column names.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct TrainingRow {
    pub montant_pret: Option<f64>,
    pub age: i32,
    pub taille: f64,
    pub poids: f64,
    pub historique_credits: Option<f64>,
    pub risque_personnel_client: Option<f64>,
    pub score_credit_client: Option<f64>,
    pub revenu_estime_mois: i32,
    pub loyer_mensuel: Option<f64>,
    pub score_credit_pret: Option<f64>,
    pub risque_personnel_pret: Option<f64>,
    pub sport_licence: String,
    pub smoker: String,
    pub niveau_etude: String,
    pub region: String,
    pub situation_familiale: Option<String>,
    pub nb_enfants: Option<i32>,
    pub quotient_caf: Option<f64>,
}
