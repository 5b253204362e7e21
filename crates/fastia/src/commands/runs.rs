//! Runs command - lists recent tracked training runs.

use anyhow::Result;
use sqlx::PgPool;
use tracking::RunRepository;

/// Runs the runs command.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn run(pool: &PgPool, limit: i64) -> Result<()> {
    let runs = RunRepository::list_recent(pool, limit).await?;

    if runs.is_empty() {
        println!("No runs recorded yet.");
        return Ok(());
    }

    for run in runs {
        let ended = run
            .ended_at
            .map_or_else(|| "-".to_string(), |t| t.to_rfc3339());

        println!(
            "{}  {:<10} {:<24} started {}  ended {}",
            run.id,
            run.status.as_str(),
            run.name,
            run.started_at.to_rfc3339(),
            ended
        );

        let metrics = RunRepository::metrics(pool, run.id).await?;
        for metric in metrics {
            println!("    {} = {:.6}", metric.name, metric.value);
        }
    }

    Ok(())
}
