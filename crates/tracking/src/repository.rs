//! Repository functions for experiment-tracking operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Run, RunArtifact, RunMetric, RunParam, RunStatus};

/// Repository for run operations.
pub struct RunRepository;

impl RunRepository {
    /// Starts a new run with status `running`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn start(pool: &PgPool, name: &str) -> Result<Run, sqlx::Error> {
        let id = Uuid::new_v4();

        sqlx::query_as::<_, Run>(
            "INSERT INTO runs (id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// Marks a run as finished and stamps its end time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn finish(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        Self::close(pool, id, RunStatus::Finished).await
    }

    /// Marks a run as failed and stamps its end time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn fail(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        Self::close(pool, id, RunStatus::Failed).await
    }

    async fn close(pool: &PgPool, id: Uuid, status: RunStatus) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE runs SET status = $2, ended_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Finds a run by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Run>, sqlx::Error> {
        sqlx::query_as::<_, Run>("SELECT * FROM runs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Returns the most recently started finished run, if any.
    ///
    /// Inference resolves its model and transformer through this run, so a
    /// run that failed or is still training is never picked up.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn latest_finished(pool: &PgPool) -> Result<Option<Run>, sqlx::Error> {
        sqlx::query_as::<_, Run>(
            "SELECT * FROM runs WHERE status = $1 ORDER BY started_at DESC LIMIT 1",
        )
        .bind(RunStatus::Finished)
        .fetch_optional(pool)
        .await
    }

    /// Lists the most recently started runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Run>, sqlx::Error> {
        sqlx::query_as::<_, Run>("SELECT * FROM runs ORDER BY started_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Logs a named parameter for a run, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn log_param(
        pool: &PgPool,
        run_id: Uuid,
        name: &str,
        value: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO run_params (run_id, name, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (run_id, name) DO UPDATE SET value = EXCLUDED.value
            ",
        )
        .bind(run_id)
        .bind(name)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Logs a named scalar metric for a run, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn log_metric(
        pool: &PgPool,
        run_id: Uuid,
        name: &str,
        value: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO run_metrics (run_id, name, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (run_id, name) DO UPDATE SET value = EXCLUDED.value
            ",
        )
        .bind(run_id)
        .bind(name)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Records an artifact path for a run, replacing any previous record
    /// under the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn record_artifact(
        pool: &PgPool,
        run_id: Uuid,
        name: &str,
        path: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO run_artifacts (run_id, name, path)
            VALUES ($1, $2, $3)
            ON CONFLICT (run_id, name) DO UPDATE SET path = EXCLUDED.path
            ",
        )
        .bind(run_id)
        .bind(name)
        .bind(path)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Lists every parameter logged for a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn params(pool: &PgPool, run_id: Uuid) -> Result<Vec<RunParam>, sqlx::Error> {
        sqlx::query_as::<_, RunParam>(
            "SELECT * FROM run_params WHERE run_id = $1 ORDER BY name",
        )
        .bind(run_id)
        .fetch_all(pool)
        .await
    }

    /// Lists every metric logged for a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn metrics(pool: &PgPool, run_id: Uuid) -> Result<Vec<RunMetric>, sqlx::Error> {
        sqlx::query_as::<_, RunMetric>(
            "SELECT * FROM run_metrics WHERE run_id = $1 ORDER BY name",
        )
        .bind(run_id)
        .fetch_all(pool)
        .await
    }

    /// Lists every artifact recorded for a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn artifacts(pool: &PgPool, run_id: Uuid) -> Result<Vec<RunArtifact>, sqlx::Error> {
        sqlx::query_as::<_, RunArtifact>(
            "SELECT * FROM run_artifacts WHERE run_id = $1 ORDER BY name",
        )
        .bind(run_id)
        .fetch_all(pool)
        .await
    }

    /// Finds one named artifact of a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn artifact_by_name(
        pool: &PgPool,
        run_id: Uuid,
        name: &str,
    ) -> Result<Option<RunArtifact>, sqlx::Error> {
        sqlx::query_as::<_, RunArtifact>(
            "SELECT * FROM run_artifacts WHERE run_id = $1 AND name = $2",
        )
        .bind(run_id)
        .bind(name)
        .fetch_optional(pool)
        .await
    }
}
