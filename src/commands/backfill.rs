//! Past-day backfill stage.

use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;

use crate::config::Config;
use crate::ingest::OpenMeteoClient;
use crate::store;

// ---

/// Fetch the past day of hourly readings and upsert every complete hour.
///
/// Incomplete hours were already skipped during the join; upserting makes
/// the stage safe to re-run over the same day.
pub async fn run(pool: &PgPool, config: &Config) -> Result<()> {
    // ---
    let client = OpenMeteoClient::new(config);
    let readings = client.fetch_past_day(Utc::now()).await?;

    let mut written = 0usize;
    for reading in &readings {
        store::upsert_reading(pool, reading).await?;
        written += 1;
    }

    tracing::info!("Backfill complete, upserted {} hourly readings", written);
    Ok(())
}
