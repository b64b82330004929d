//! Training tournament stage.

use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;

use crate::error::PipelineError;
use crate::store;
use crate::train;

// ---

/// Load all accumulated readings, run the tournament and append the winning
/// artifact to the registry.
///
/// On any failure nothing is written, so the previously persisted champion
/// stays authoritative.
pub async fn run(pool: &PgPool) -> Result<()> {
    // ---
    tracing::info!("Starting model tournament");

    let readings = store::fetch_readings(pool).await?;
    if readings.is_empty() {
        return Err(PipelineError::DataUnavailable {
            reason: "no readings in store; run ingest first".into(),
        }
        .into());
    }

    let artifact = train::train(&readings, Utc::now())?;
    store::insert_artifact(pool, &artifact).await?;

    tracing::info!(
        "Champion '{}' saved to registry (artifact {}, rmse {:.4})",
        artifact.model_name,
        artifact.id,
        artifact.metrics.rmse
    );

    Ok(())
}
