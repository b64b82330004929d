//! Current-hour ingest stage.

use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;

use crate::config::Config;
use crate::ingest::OpenMeteoClient;
use crate::store;

// ---

/// Fetch the current conditions and upsert the hour's reading.
///
/// Fetch failures are fatal for the run; the store is never left with a
/// partial hour because the reading is assembled fully before the single
/// upsert.
pub async fn run(pool: &PgPool, config: &Config) -> Result<()> {
    // ---
    let client = OpenMeteoClient::new(config);
    let reading = client.fetch_current(Utc::now()).await?;

    store::upsert_reading(pool, &reading).await?;
    tracing::info!(
        "Upserted reading for {} (pm2_5 {:.1}, temp {:.1})",
        reading.timestamp,
        reading.pm2_5,
        reading.temp
    );

    Ok(())
}
