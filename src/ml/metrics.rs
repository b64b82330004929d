//! Regression evaluation metrics.
//!
//! The trio the tournament records for every candidate: mean absolute
//! error, root mean squared error, and the coefficient of determination.

use serde::{Deserialize, Serialize};

// ---

/// Held-out evaluation scores for one model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Metrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

/// Compute all three metrics for aligned actual/predicted slices.
///
/// Callers guarantee the slices are the same non-zero length; the training
/// stage never scores a candidate on an empty split.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Metrics {
    // ---
    Metrics {
        mae: mean_absolute_error(actual, predicted),
        rmse: root_mean_squared_error(actual, predicted),
        r2: r2_score(actual, predicted),
    }
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    // ---
    let n = actual.len() as f64;
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n
}

pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    // ---
    let n = actual.len() as f64;
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum::<f64>()
        / n;
    mse.sqrt()
}

/// R² = 1 - SS_res / SS_tot.
///
/// A constant actual series has no variance to explain; scored as 1.0 for a
/// perfect fit and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    // ---
    let n = actual.len() as f64;
    let mean = actual.iter().sum::<f64>() / n;

    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }

    1.0 - ss_res / ss_tot
}
