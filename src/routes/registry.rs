//! Model registry endpoints for the presentation layer.
//!
//! Read-only views over the append-only `model_registry`: the current
//! champion with its tournament leaderboard, and the full training history.
//! A missing registry is an explicit `"unavailable"` payload, not an error
//! status — the dashboard renders it as a waiting state.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tracing::error;

use crate::store::{self, ArtifactSummary};
use crate::train::LeaderboardEntry;
use crate::Config;

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new()
        .route("/api/registry", get(latest))
        .route("/api/registry/history", get(history))
}

#[derive(Serialize)]
struct RegistryView {
    status: &'static str,
    champion: ArtifactSummary,
    /// Written unsorted at training time; sorted here for display.
    leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Serialize)]
struct Unavailable {
    status: &'static str,
    reason: &'static str,
}

async fn latest(State((pool, _config)): State<(PgPool, Config)>) -> impl IntoResponse {
    // ---
    let summary = match store::artifact_history(&pool, 1).await {
        Ok(mut rows) => rows.pop(),
        Err(e) => {
            error!("Failed to query model registry: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to query registry"),
            )
                .into_response();
        }
    };

    let Some(champion) = summary else {
        return (
            StatusCode::OK,
            Json(Unavailable {
                status: "unavailable",
                reason: "no training run recorded yet",
            }),
        )
            .into_response();
    };

    let mut leaderboard = match store::latest_leaderboard(&pool).await {
        Ok(entries) => entries.unwrap_or_default(),
        Err(e) => {
            error!("Failed to load leaderboard: {}", e);
            Vec::new()
        }
    };
    leaderboard.sort_by(|a, b| a.rmse.total_cmp(&b.rmse));

    (
        StatusCode::OK,
        Json(RegistryView {
            status: "ok",
            champion,
            leaderboard,
        }),
    )
        .into_response()
}

async fn history(State((pool, _config)): State<(PgPool, Config)>) -> impl IntoResponse {
    // ---
    match store::artifact_history(&pool, 50).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => {
            error!("Failed to query registry history: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to query registry history"),
            )
                .into_response()
        }
    }
}
