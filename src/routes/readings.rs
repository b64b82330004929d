use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use crate::{store, Config};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/api/readings", get(handler))
}

/// Query parameters for the readings endpoint.
#[derive(Debug, Deserialize)]
pub struct ReadingsQuery {
    /// Window of recent hours to return (default 24).
    hours: Option<u32>,
    /// Cap on the number of rows returned, newest kept.
    limit: Option<u32>,
}

async fn handler(
    Query(params): Query<ReadingsQuery>,
    State((pool, _config)): State<(PgPool, Config)>,
) -> impl IntoResponse {
    // ---
    let hours = params.hours.unwrap_or(24);
    let cutoff = Utc::now() - Duration::hours(hours as i64);

    let mut readings = match store::fetch_readings_since(&pool, cutoff).await {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to fetch readings: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to fetch readings"),
            )
                .into_response();
        }
    };

    // Rows come back chronological; keep the newest when capped.
    if let Some(limit) = params.limit {
        let limit = limit as usize;
        if readings.len() > limit {
            readings.drain(..readings.len() - limit);
        }
    }

    info!("GET /api/readings - returning {} rows", readings.len());
    (StatusCode::OK, Json(readings)).into_response()
}
