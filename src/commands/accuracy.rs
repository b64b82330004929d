//! Live-performance check stage.
//!
//! The tournament's held-out metrics describe the past; this stage answers
//! the operator's question "how is the champion doing on the hours that
//! actually happened since".

use anyhow::Result;
use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::error::PipelineError;
use crate::ml;
use crate::store;
use crate::train::build_examples;

// ---

/// One-step-ahead evaluation of the current champion over the most recent
/// observed hours.
pub async fn run(pool: &PgPool, hours: u32) -> Result<()> {
    // ---
    tracing::info!("Checking champion accuracy on the last {} observed hours", hours);

    let Some(artifact) = store::latest_artifact(pool).await? else {
        return Err(PipelineError::DataUnavailable {
            reason: "no model in registry; run train first".into(),
        }
        .into());
    };

    // One extra hour so the oldest scored row still has its lag available.
    let cutoff = Utc::now() - Duration::hours(hours as i64 + 1);
    let readings = store::fetch_readings_since(pool, cutoff).await?;

    let (x, actual) = build_examples(&readings);
    if actual.is_empty() {
        return Err(PipelineError::DataUnavailable {
            reason: "no complete recent readings to score against".into(),
        }
        .into());
    }

    let mut predicted = Vec::with_capacity(x.len());
    for row in &x {
        predicted.push(artifact.model.predict_one(row)?);
    }

    let metrics = ml::evaluate(&actual, &predicted);
    tracing::info!(
        "Live performance of '{}' over {} hours: mae={:.2} rmse={:.2}",
        artifact.model_name,
        actual.len(),
        metrics.mae,
        metrics.rmse
    );

    // Surface the worst misses for debugging drift.
    let mut misses: Vec<(f64, f64)> = actual.iter().copied().zip(predicted).collect();
    misses.sort_by(|a, b| {
        let da = (a.0 - a.1).abs();
        let db = (b.0 - b.1).abs();
        db.total_cmp(&da)
    });
    for (actual, predicted) in misses.iter().take(5) {
        tracing::info!(
            "  actual {:>6.1}  predicted {:>6.1}  diff {:>5.1}",
            actual,
            predicted,
            (actual - predicted).abs()
        );
    }

    Ok(())
}
