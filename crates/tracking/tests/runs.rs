//! Run lifecycle tests against a live `PostgreSQL` instance.
//!
//! Run with `DATABASE_URL` pointing at a migrated database:
//! `cargo test -p tracking -- --ignored`

use bytes::Bytes;
use database::{create_pool, run_migrations};
use sqlx::PgPool;
use tracking::{RunRepository, RunStatus, fetch_artifact, store_artifact};

async fn test_pool() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")?;
    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn run_lifecycle_running_to_finished() -> anyhow::Result<()> {
    let pool = test_pool().await?;

    let run = RunRepository::start(&pool, "lifecycle-test").await?;
    assert_eq!(run.status, RunStatus::Running);
    assert!(run.ended_at.is_none());

    RunRepository::finish(&pool, run.id).await?;

    let finished = RunRepository::find_by_id(&pool, run.id)
        .await?
        .expect("run should still exist");
    assert_eq!(finished.status, RunStatus::Finished);
    assert!(finished.ended_at.is_some());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn failed_runs_are_skipped_by_latest_finished() -> anyhow::Result<()> {
    let pool = test_pool().await?;

    let good = RunRepository::start(&pool, "good-run").await?;
    RunRepository::finish(&pool, good.id).await?;

    let bad = RunRepository::start(&pool, "bad-run").await?;
    RunRepository::fail(&pool, bad.id).await?;

    let latest = RunRepository::latest_finished(&pool)
        .await?
        .expect("a finished run exists");
    assert_eq!(latest.id, good.id);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn params_and_metrics_round_trip() -> anyhow::Result<()> {
    let pool = test_pool().await?;

    let run = RunRepository::start(&pool, "logging-test").await?;

    RunRepository::log_param(&pool, run.id, "epochs", "100").await?;
    RunRepository::log_param(&pool, run.id, "epochs", "50").await?;
    RunRepository::log_metric(&pool, run.id, "mse", 123.45).await?;

    let params = RunRepository::params(&pool, run.id).await?;
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].value, "50");

    let metrics = RunRepository::metrics(&pool, run.id).await?;
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].value, 123.45);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn artifacts_round_trip_through_the_store() -> anyhow::Result<()> {
    let pool = test_pool().await?;

    let run = RunRepository::start(&pool, "artifact-test").await?;
    let payload = Bytes::from_static(b"{\"numeric\":[]}");

    let path = store_artifact(&pool, run.id, "preprocessor.json", payload.clone()).await?;
    assert!(path.contains(&run.id.to_string()));

    let restored = fetch_artifact(&pool, run.id, "preprocessor.json").await?;
    assert_eq!(restored, payload);

    let artifacts = RunRepository::artifacts(&pool, run.id).await?;
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].name, "preprocessor.json");

    Ok(())
}
