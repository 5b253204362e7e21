//! Experiment-tracking model types.

use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Run lifecycle status matching the `PostgreSQL` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "run_status", rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

impl RunStatus {
    /// Lowercase form matching the database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
        }
    }
}

/// A training run.
///
/// The run ID doubles as the handle for everything logged against it:
/// params, metrics and artifact paths all key on it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Run {
    pub id: Uuid,
    pub name: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// A hyperparameter or setting logged against a run.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunParam {
    pub run_id: Uuid,
    pub name: String,
    pub value: String,
}

/// A scalar metric logged against a run.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunMetric {
    pub run_id: Uuid,
    pub name: String,
    pub value: f64,
}

/// An artifact recorded for a run; `path` locates it in the artifact store.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunArtifact {
    pub run_id: Uuid,
    pub name: String,
    pub path: String,
}
