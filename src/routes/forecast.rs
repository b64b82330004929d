//! Recursive forecast endpoint.
//!
//! Assembles the three inputs the forecaster needs — the current champion
//! from the registry, the latest observed reading as the lag seed, and the
//! upcoming hourly weather — then runs the autoregressive chain. Missing
//! model or weather degrades to an explicit `"unavailable"` payload; a
//! mid-sequence prediction failure still returns the completed prefix.

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::forecast::{self, DEFAULT_SEED_LAG};
use crate::ingest::OpenMeteoClient;
use crate::models::ForecastPoint;
use crate::{store, Config};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/api/forecast", get(handler))
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Hours ahead to predict; defaults to the configured horizon.
    hours: Option<u32>,
}

#[derive(Serialize)]
struct ForecastView {
    status: &'static str,
    model_name: String,
    seed_lag: f64,
    points: Vec<ForecastPoint>,
    /// Set when the chain stopped early; `points` holds the usable prefix.
    truncated_reason: Option<String>,
}

#[derive(Serialize)]
struct Unavailable {
    status: &'static str,
    reason: String,
}

fn unavailable(reason: String) -> axum::response::Response {
    // ---
    (
        StatusCode::OK,
        Json(Unavailable {
            status: "unavailable",
            reason,
        }),
    )
        .into_response()
}

async fn handler(
    Query(params): Query<ForecastQuery>,
    State((pool, config)): State<(PgPool, Config)>,
) -> impl IntoResponse {
    // ---
    let hours = params.hours.unwrap_or(config.forecast_horizon_hours) as usize;

    // Step 1: the champion model.
    let artifact = match store::latest_artifact(&pool).await {
        Ok(Some(artifact)) => artifact,
        Ok(None) => return unavailable("no trained model in registry".into()),
        Err(e) => {
            error!("Failed to load model artifact: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to load model"),
            )
                .into_response();
        }
    };

    // Step 2: seed the lag from the latest observation, with the documented
    // fallback when the store is empty.
    let seed_lag = match store::latest_reading(&pool).await {
        Ok(Some(reading)) => reading.pm2_5,
        Ok(None) => {
            warn!(
                "No observed reading to seed the forecast; using default {}",
                DEFAULT_SEED_LAG
            );
            DEFAULT_SEED_LAG
        }
        Err(e) => {
            error!("Failed to load latest reading: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to load readings"),
            )
                .into_response();
        }
    };

    // Step 3: upcoming weather.
    let client = OpenMeteoClient::new(&config);
    let weather = match client.fetch_weather_forecast(Utc::now(), hours).await {
        Ok(points) => points,
        Err(e) => {
            warn!("Weather forecast unavailable: {}", e);
            return unavailable(format!("weather forecast unavailable: {e}"));
        }
    };

    // Step 4: run the autoregressive chain.
    let run = match forecast::forecast(&artifact.model, &weather, seed_lag) {
        Ok(run) => run,
        Err(e) => {
            error!("Forecast rejected its input: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Forecast input invalid"),
            )
                .into_response();
        }
    };

    info!(
        "GET /api/forecast - {} points from '{}'{}",
        run.points.len(),
        artifact.model_name,
        if run.is_complete() { "" } else { " (truncated)" }
    );

    let truncated_reason = run.failure.as_ref().map(|e| e.to_string());
    (
        StatusCode::OK,
        Json(ForecastView {
            status: "ok",
            model_name: artifact.model_name,
            seed_lag,
            points: run.points,
            truncated_reason,
        }),
    )
        .into_response()
}
