//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use anyhow::Context;
use object_store::ObjectStore;
use object_store::local::LocalFileSystem;

/// Returns the base path for the artifact store.
#[must_use]
pub fn get_artifact_base_path() -> PathBuf {
    dotenvy::dotenv().ok();

    std::env::var("ARTIFACT_BASE_PATH")
        .map_or_else(|_| PathBuf::from("artifacts"), PathBuf::from)
}

/// Global artifact store instance, lazily initialized.
///
/// Backs run artifacts (fitted transformer, model checkpoints, figures)
/// with the local filesystem under `ARTIFACT_BASE_PATH`.
pub static ARTIFACT_STORE: LazyLock<Arc<dyn ObjectStore>> = LazyLock::new(|| {
    let base_path = get_artifact_base_path();

    std::fs::create_dir_all(&base_path).expect("Failed to create artifact store directory");

    Arc::new(LocalFileSystem::new_with_prefix(&base_path).expect("Failed to create artifact store"))
});

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::from_env().expect("Failed to create config"));

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `DATABASE_URL`: `PostgreSQL` connection string
    ///
    /// Optional environment variables:
    /// - `ARTIFACT_BASE_PATH`: Base directory for run artifacts (default: `artifacts`)
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing.
    fn from_env() -> anyhow::Result<Self> {
        // Load .env file
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL environment variable not set")?;

        Ok(Self { database_url })
    }
}
