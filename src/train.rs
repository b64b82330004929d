//! Model tournament: fit every candidate, score on held-out data, keep the
//! best.
//!
//! The split is chronological, not random: the last 20% of rows by time are
//! held out so evaluation never sees the future. Winner selection is lowest
//! RMSE on that held-out split; MAE and R² are recorded for the leaderboard
//! but never consulted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::ml::{self, Metrics, Regressor};
use crate::models::Reading;

// ---

/// Fewest usable examples that still give a non-degenerate 80/20 split.
pub const MIN_TRAINING_ROWS: usize = 10;

/// Fraction of rows (earliest by time) used for fitting.
const TRAIN_FRACTION: f64 = 0.8;

/// One scored candidate, as recorded in the registry. Written unsorted;
/// consumers sort for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub model_name: String,
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

/// The tournament output: the champion model plus its evaluation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub id: Uuid,
    pub model_name: String,
    pub trained_at: DateTime<Utc>,
    pub metrics: Metrics,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub model: Regressor,
}

// ---

/// Run the tournament over accumulated readings.
///
/// Fails with `InsufficientData` when fewer than [`MIN_TRAINING_ROWS`]
/// usable examples remain after lag derivation and missing-field filtering,
/// and with `TrainingFailed` when every candidate errors. A candidate that
/// errors during fit or predict is logged and excluded; it never aborts the
/// tournament.
pub fn train(readings: &[Reading], trained_at: DateTime<Utc>) -> Result<ModelArtifact> {
    // ---
    let (x, y) = build_examples(readings);

    if x.len() < MIN_TRAINING_ROWS {
        return Err(PipelineError::InsufficientData {
            got: x.len(),
            need: MIN_TRAINING_ROWS,
        });
    }

    let split_at = (x.len() as f64 * TRAIN_FRACTION) as usize;
    let (x_train, x_test) = x.split_at(split_at);
    let (y_train, y_test) = y.split_at(split_at);

    tracing::info!(
        "Tournament: {} examples, {} train / {} held out",
        x.len(),
        x_train.len(),
        x_test.len()
    );

    let mut winner: Option<(Regressor, Metrics)> = None;
    let mut leaderboard = Vec::new();

    for mut candidate in Regressor::candidates() {
        let name = candidate.name();

        if let Err(e) = candidate.fit(x_train, y_train) {
            tracing::warn!("Candidate '{}' failed to fit, excluded: {}", name, e);
            continue;
        }

        let predictions = match predict_all(&candidate, x_test) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Candidate '{}' failed to score, excluded: {}", name, e);
                continue;
            }
        };

        let metrics = ml::evaluate(y_test, &predictions);
        tracing::info!(
            "  {:<20} mae={:.4} rmse={:.4} r2={:.4}",
            name,
            metrics.mae,
            metrics.rmse,
            metrics.r2
        );

        leaderboard.push(LeaderboardEntry {
            model_name: name.to_string(),
            mae: metrics.mae,
            rmse: metrics.rmse,
            r2: metrics.r2,
        });

        // Strict less-than keeps the first-declared candidate on ties.
        let improves = match &winner {
            None => true,
            Some((_, best)) => metrics.rmse < best.rmse,
        };
        if improves {
            winner = Some((candidate, metrics));
        }
    }

    let Some((model, metrics)) = winner else {
        return Err(PipelineError::TrainingFailed);
    };

    tracing::info!("Tournament winner: {} (rmse {:.4})", model.name(), metrics.rmse);

    Ok(ModelArtifact {
        id: Uuid::new_v4(),
        model_name: model.name().to_string(),
        trained_at,
        metrics,
        leaderboard,
        model,
    })
}

/// Turn raw readings into aligned feature rows and targets.
///
/// Readings are sorted chronologically, the lag feature is the previous
/// reading's `pm2_5` (so the first row is always dropped), and any row whose
/// required fields or lag are missing/non-finite is skipped rather than
/// aborting the batch.
pub fn build_examples(readings: &[Reading]) -> (Vec<Vec<f64>>, Vec<f64>) {
    // ---
    let mut sorted: Vec<&Reading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);

    let mut x = Vec::with_capacity(sorted.len().saturating_sub(1));
    let mut y = Vec::with_capacity(sorted.len().saturating_sub(1));

    let mut previous_pm2_5: Option<f64> = None;
    let mut skipped = 0usize;

    for reading in sorted {
        let lag = previous_pm2_5;
        previous_pm2_5 = Some(reading.pm2_5);

        let Some(lag) = lag else {
            continue; // first chronological row has no lag
        };

        if !reading.is_trainable() || !lag.is_finite() {
            skipped += 1;
            continue;
        }

        x.push(vec![
            reading.temp,
            reading.humidity,
            reading.wind_speed,
            reading.hour as f64,
            lag,
        ]);
        y.push(reading.pm2_5);
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} rows with missing fields", skipped);
    }

    (x, y)
}

fn predict_all(model: &Regressor, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
    // ---
    rows.iter().map(|row| model.predict_one(row)).collect()
}
