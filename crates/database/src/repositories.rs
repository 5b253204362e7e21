//! Repository functions for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Client, CreateClient, CreatePret, Pret, TrainingRow};

/// Repository for client operations.
pub struct ClientRepository;

impl ClientRepository {
    /// Creates a new client record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(pool: &PgPool, input: CreateClient) -> Result<Client, sqlx::Error> {
        let id = Uuid::new_v4();

        sqlx::query_as::<_, Client>(
            r"
            INSERT INTO clients (
                id, age, taille, poids, sport_licence, smoker, niveau_etude, region,
                situation_familiale, historique_credits, risque_personnel, score_credit,
                date_creation_compte, nb_enfants, quotient_caf
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            ",
        )
        .bind(id)
        .bind(input.age)
        .bind(input.taille)
        .bind(input.poids)
        .bind(&input.sport_licence)
        .bind(&input.smoker)
        .bind(&input.niveau_etude)
        .bind(&input.region)
        .bind(&input.situation_familiale)
        .bind(input.historique_credits)
        .bind(input.risque_personnel)
        .bind(input.score_credit)
        .bind(input.date_creation_compte)
        .bind(input.nb_enfants)
        .bind(input.quotient_caf)
        .fetch_one(pool)
        .await
    }

    /// Finds a client by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Client>, sqlx::Error> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists clients with pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<Client>, sqlx::Error> {
        sqlx::query_as::<_, Client>(
            "SELECT * FROM clients ORDER BY created_at OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Replaces every mutable field of a client record.
    ///
    /// Returns `None` if no client with the given ID exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: CreateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        sqlx::query_as::<_, Client>(
            r"
            UPDATE clients
            SET age = $2, taille = $3, poids = $4, sport_licence = $5, smoker = $6,
                niveau_etude = $7, region = $8, situation_familiale = $9,
                historique_credits = $10, risque_personnel = $11, score_credit = $12,
                date_creation_compte = $13, nb_enfants = $14, quotient_caf = $15
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(input.age)
        .bind(input.taille)
        .bind(input.poids)
        .bind(&input.sport_licence)
        .bind(&input.smoker)
        .bind(&input.niveau_etude)
        .bind(&input.region)
        .bind(&input.situation_familiale)
        .bind(input.historique_credits)
        .bind(input.risque_personnel)
        .bind(input.score_credit)
        .bind(input.date_creation_compte)
        .bind(input.nb_enfants)
        .bind(input.quotient_caf)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a client by its ID. Owned loan applications are removed by
    /// the store through the cascading foreign key.
    ///
    /// Returns the number of rows deleted (0 when the ID was unknown).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts all client records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients")
            .fetch_one(pool)
            .await
    }

    /// Reads the flattened `(Client, Pret)` inner join used as training input.
    ///
    /// A client without loan applications yields no row; a loan application
    /// without a client cannot exist due to the foreign-key constraint.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn training_rows(pool: &PgPool) -> Result<Vec<TrainingRow>, sqlx::Error> {
        sqlx::query_as::<_, TrainingRow>(
            r"
            SELECT
                p.montant_pret,
                c.age,
                c.taille,
                c.poids,
                c.historique_credits,
                c.risque_personnel AS risque_personnel_client,
                c.score_credit AS score_credit_client,
                p.revenu_estime_mois,
                p.loyer_mensuel,
                p.score_credit AS score_credit_pret,
                p.risque_personnel AS risque_personnel_pret,
                c.sport_licence,
                c.smoker,
                c.niveau_etude,
                c.region,
                c.situation_familiale,
                c.nb_enfants,
                c.quotient_caf
            FROM prets p
            JOIN clients c ON c.id = p.client_id
            ORDER BY p.created_at
            ",
        )
        .fetch_all(pool)
        .await
    }
}

/// Repository for loan application operations.
pub struct PretRepository;

impl PretRepository {
    /// Creates a new loan application record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(pool: &PgPool, input: CreatePret) -> Result<Pret, sqlx::Error> {
        let id = Uuid::new_v4();

        sqlx::query_as::<_, Pret>(
            r"
            INSERT INTO prets (
                id, client_id, montant_pret, revenu_estime_mois,
                loyer_mensuel, score_credit, risque_personnel
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            ",
        )
        .bind(id)
        .bind(input.client_id)
        .bind(input.montant_pret)
        .bind(input.revenu_estime_mois)
        .bind(input.loyer_mensuel)
        .bind(input.score_credit)
        .bind(input.risque_personnel)
        .fetch_one(pool)
        .await
    }

    /// Finds a loan application by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Pret>, sqlx::Error> {
        sqlx::query_as::<_, Pret>("SELECT * FROM prets WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists loan applications with pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<Pret>, sqlx::Error> {
        sqlx::query_as::<_, Pret>("SELECT * FROM prets ORDER BY created_at OFFSET $1 LIMIT $2")
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Lists all loan applications owned by a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_by_client(pool: &PgPool, client_id: Uuid) -> Result<Vec<Pret>, sqlx::Error> {
        sqlx::query_as::<_, Pret>(
            "SELECT * FROM prets WHERE client_id = $1 ORDER BY created_at",
        )
        .bind(client_id)
        .fetch_all(pool)
        .await
    }

    /// Replaces every mutable field of a loan application record.
    ///
    /// Returns `None` if no record with the given ID exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: CreatePret,
    ) -> Result<Option<Pret>, sqlx::Error> {
        sqlx::query_as::<_, Pret>(
            r"
            UPDATE prets
            SET client_id = $2, montant_pret = $3, revenu_estime_mois = $4,
                loyer_mensuel = $5, score_credit = $6, risque_personnel = $7
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(input.client_id)
        .bind(input.montant_pret)
        .bind(input.revenu_estime_mois)
        .bind(input.loyer_mensuel)
        .bind(input.score_credit)
        .bind(input.risque_personnel)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a loan application by its ID.
    ///
    /// Returns the number of rows deleted (0 when the ID was unknown).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts all loan application records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM prets")
            .fetch_one(pool)
            .await
    }
}
