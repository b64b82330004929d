//! Store access for readings and the model registry.
//!
//! All statements are runtime-checked `sqlx::query` calls over the pool the
//! caller owns; nothing here caches connections or state between calls.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::ml::Regressor;
use crate::models::Reading;
use crate::train::{LeaderboardEntry, ModelArtifact};

// ---

/// Registry row without the serialized model, for leaderboard/history views.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ArtifactSummary {
    pub id: Uuid,
    pub model_name: String,
    pub trained_at: DateTime<Utc>,
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

// ---

/// Insert or update the reading for its hour (last write wins).
///
/// Repeated calls with the same hour and payload are no-ops in effect;
/// a different payload for the same hour overwrites every column.
pub async fn upsert_reading(pool: &PgPool, reading: &Reading) -> Result<()> {
    // ---
    sqlx::query(
        r#"
        INSERT INTO readings (
            timestamp, pm2_5, pm10, no2, temp, humidity, wind_speed, hour
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (timestamp) DO UPDATE SET
            pm2_5      = EXCLUDED.pm2_5,
            pm10       = EXCLUDED.pm10,
            no2        = EXCLUDED.no2,
            temp       = EXCLUDED.temp,
            humidity   = EXCLUDED.humidity,
            wind_speed = EXCLUDED.wind_speed,
            hour       = EXCLUDED.hour
        "#,
    )
    .bind(reading.timestamp)
    .bind(reading.pm2_5)
    .bind(reading.pm10)
    .bind(reading.no2)
    .bind(reading.temp)
    .bind(reading.humidity)
    .bind(reading.wind_speed)
    .bind(reading.hour)
    .execute(pool)
    .await?;

    Ok(())
}

/// All readings in chronological order.
pub async fn fetch_readings(pool: &PgPool) -> Result<Vec<Reading>> {
    // ---
    let rows = sqlx::query_as::<_, Reading>(
        r#"
        SELECT timestamp, pm2_5, pm10, no2, temp, humidity, wind_speed, hour
        FROM readings
        ORDER BY timestamp ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Readings at or after `cutoff`, chronological.
pub async fn fetch_readings_since(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<Vec<Reading>> {
    // ---
    let rows = sqlx::query_as::<_, Reading>(
        r#"
        SELECT timestamp, pm2_5, pm10, no2, temp, humidity, wind_speed, hour
        FROM readings
        WHERE timestamp >= $1
        ORDER BY timestamp ASC
        "#,
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Most recent reading, if any. Seeds the forecast lag.
pub async fn latest_reading(pool: &PgPool) -> Result<Option<Reading>> {
    // ---
    let row = sqlx::query_as::<_, Reading>(
        r#"
        SELECT timestamp, pm2_5, pm10, no2, temp, humidity, wind_speed, hour
        FROM readings
        ORDER BY timestamp DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

// ---

/// Append a training run to the registry.
///
/// Append-only by design: the prior champion stays untouched, history is
/// preserved for auditing, and "current" means newest `trained_at`.
pub async fn insert_artifact(pool: &PgPool, artifact: &ModelArtifact) -> Result<()> {
    // ---
    sqlx::query(
        r#"
        INSERT INTO model_registry (
            id, model_name, trained_at, mae, rmse, r2, leaderboard, model
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(artifact.id)
    .bind(&artifact.model_name)
    .bind(artifact.trained_at)
    .bind(artifact.metrics.mae)
    .bind(artifact.metrics.rmse)
    .bind(artifact.metrics.r2)
    .bind(Json(&artifact.leaderboard))
    .bind(Json(&artifact.model))
    .execute(pool)
    .await?;

    Ok(())
}

/// The authoritative artifact: newest `trained_at`, with the serialized
/// model and leaderboard decoded.
pub async fn latest_artifact(pool: &PgPool) -> Result<Option<ModelArtifact>> {
    // ---
    #[derive(sqlx::FromRow)]
    struct Row {
        id: Uuid,
        model_name: String,
        trained_at: DateTime<Utc>,
        mae: f64,
        rmse: f64,
        r2: f64,
        leaderboard: Json<Vec<LeaderboardEntry>>,
        model: Json<Regressor>,
    }

    let row = sqlx::query_as::<_, Row>(
        r#"
        SELECT id, model_name, trained_at, mae, rmse, r2, leaderboard, model
        FROM model_registry
        ORDER BY trained_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| ModelArtifact {
        id: r.id,
        model_name: r.model_name,
        trained_at: r.trained_at,
        metrics: crate::ml::Metrics {
            mae: r.mae,
            rmse: r.rmse,
            r2: r.r2,
        },
        leaderboard: r.leaderboard.0,
        model: r.model.0,
    }))
}

/// Training history, newest first, without the model payloads.
pub async fn artifact_history(pool: &PgPool, limit: i64) -> Result<Vec<ArtifactSummary>> {
    // ---
    let rows = sqlx::query_as::<_, ArtifactSummary>(
        r#"
        SELECT id, model_name, trained_at, mae, rmse, r2
        FROM model_registry
        ORDER BY trained_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Leaderboard of the newest artifact, for the registry view.
pub async fn latest_leaderboard(pool: &PgPool) -> Result<Option<Vec<LeaderboardEntry>>> {
    // ---
    #[derive(sqlx::FromRow)]
    struct Row {
        leaderboard: Json<Vec<LeaderboardEntry>>,
    }

    let row = sqlx::query_as::<_, Row>(
        r#"
        SELECT leaderboard
        FROM model_registry
        ORDER BY trained_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.leaderboard.0))
}
