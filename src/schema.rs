//! Database schema management for `aqiflow`.
//!
//! Ensures required tables and indexes exist before any stage runs.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `readings` table (one row per hour, upsert-by-timestamp) and
/// the append-only `model_registry`. Safe to call on every startup; no-op
/// if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Hourly observations; the primary key is what makes ingest upserts
    // idempotent per hour.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS readings (
            timestamp  TIMESTAMPTZ      PRIMARY KEY,
            pm2_5      DOUBLE PRECISION NOT NULL,
            pm10       DOUBLE PRECISION NOT NULL,
            no2        DOUBLE PRECISION,
            temp       DOUBLE PRECISION NOT NULL,
            humidity   DOUBLE PRECISION NOT NULL,
            wind_speed DOUBLE PRECISION NOT NULL,
            hour       INTEGER          NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Append-only training history; the champion is the newest row by
    // trained_at. A failed training run inserts nothing, so prior champions
    // are never disturbed.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS model_registry (
            id          UUID             PRIMARY KEY,
            model_name  TEXT             NOT NULL,
            trained_at  TIMESTAMPTZ      NOT NULL,
            mae         DOUBLE PRECISION NOT NULL,
            rmse        DOUBLE PRECISION NOT NULL,
            r2          DOUBLE PRECISION NOT NULL,
            leaderboard JSONB            NOT NULL,
            model       JSONB            NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Champion lookup is ORDER BY trained_at DESC LIMIT 1.
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_model_registry_trained_at
            ON model_registry (trained_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
