//! Artifact storage for runs.
//!
//! Artifacts live in the shared object store under `runs/<run_id>/<name>`,
//! so every run keeps its own copies and nothing is overwritten in place.

use anyhow::{Context, Result};
use bytes::Bytes;
use config::ARTIFACT_STORE;
use object_store::ObjectStore;
use object_store::path::Path as ObjectStorePath;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::repository::RunRepository;

/// Builds the object-store path for one named artifact of a run.
#[must_use]
pub fn artifact_path(run_id: Uuid, name: &str) -> ObjectStorePath {
    ObjectStorePath::from(format!("runs/{run_id}/{name}"))
}

/// Writes an artifact to the object store and records it against the run.
///
/// Returns the object-store path the artifact was written to.
///
/// # Errors
///
/// Returns an error if the store write or the database insert fails.
pub async fn store_artifact(
    pool: &PgPool,
    run_id: Uuid,
    name: &str,
    data: Bytes,
) -> Result<String> {
    let path = artifact_path(run_id, name);

    ARTIFACT_STORE
        .put(&path, data.into())
        .await
        .with_context(|| format!("Failed to write artifact `{name}` to the store"))?;

    RunRepository::record_artifact(pool, run_id, name, path.as_ref())
        .await
        .with_context(|| format!("Failed to record artifact `{name}`"))?;

    debug!(run_id = %run_id, artifact = name, path = %path, "Stored artifact");
    Ok(path.to_string())
}

/// Reads back a named artifact of a run from the object store.
///
/// # Errors
///
/// Returns an error if the artifact is not recorded for the run or the
/// store read fails.
pub async fn fetch_artifact(pool: &PgPool, run_id: Uuid, name: &str) -> Result<Bytes> {
    let artifact = RunRepository::artifact_by_name(pool, run_id, name)
        .await
        .context("Failed to look up artifact record")?
        .with_context(|| format!("Run {run_id} has no artifact named `{name}`"))?;

    let path = ObjectStorePath::from(artifact.path);
    let data = ARTIFACT_STORE
        .get(&path)
        .await
        .with_context(|| format!("Failed to read artifact `{name}` from the store"))?
        .bytes()
        .await
        .with_context(|| format!("Failed to read artifact `{name}` bytes"))?;

    Ok(data)
}
