//! Experiment tracking for training runs.
//!
//! Each training invocation opens a run, logs its hyperparameters, metrics
//! and artifacts against it, and closes it as finished or failed. Runs and
//! their logged values live in `PostgreSQL`; artifact payloads live in the
//! shared object store, keyed by run ID.

mod artifacts;
mod models;
mod repository;

pub use artifacts::{artifact_path, fetch_artifact, store_artifact};
pub use models::{Run, RunArtifact, RunMetric, RunParam, RunStatus};
pub use repository::RunRepository;
