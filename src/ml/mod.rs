//! Candidate regression models for the training tournament.
//!
//! All three candidates are implemented in-tree: the feature space is five
//! columns and the training sets are small, so plain Rust keeps the fits
//! fast, deterministic and serializable. `Regressor` is an enum rather than
//! a trait object so the winning model can round-trip through the registry
//! as JSON.

mod forest;
mod gbm;
mod linear;
mod metrics;
mod tree;

pub use forest::RandomForestRegressor;
pub use gbm::GradientBoostingRegressor;
pub use linear::LinearRegressor;
pub use metrics::{evaluate, mean_absolute_error, r2_score, root_mean_squared_error, Metrics};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

// ---

/// Model input columns, in the exact order every fit and every prediction
/// uses. The forecaster assembles its feature vectors against this order.
pub const FEATURE_NAMES: [&str; 5] = ["temp", "humidity", "wind_speed", "hour", "pm2_5_lag1"];

/// Seed for every randomized fit; fixed so tournaments are reproducible.
pub const RANDOM_SEED: u64 = 42;

// ---

/// One candidate (or trained champion) regression model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Regressor {
    Linear(LinearRegressor),
    Forest(RandomForestRegressor),
    GradientBoosting(GradientBoostingRegressor),
}

impl Regressor {
    /// The candidate lineup in fixed enumeration order. Tournament ties are
    /// broken by this order, first declared wins.
    pub fn candidates() -> Vec<Regressor> {
        // ---
        vec![
            Regressor::Linear(LinearRegressor::new()),
            Regressor::Forest(RandomForestRegressor::new(100, RANDOM_SEED)),
            Regressor::GradientBoosting(GradientBoostingRegressor::new(100, 0.1)),
        ]
    }

    pub fn name(&self) -> &'static str {
        // ---
        match self {
            Regressor::Linear(_) => "linear_regression",
            Regressor::Forest(_) => "random_forest",
            Regressor::GradientBoosting(_) => "gradient_boosting",
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        // ---
        match self {
            Regressor::Linear(m) => m.fit(x, y),
            Regressor::Forest(m) => m.fit(x, y),
            Regressor::GradientBoosting(m) => m.fit(x, y),
        }
    }

    /// Predict a single row, in [`FEATURE_NAMES`] order.
    ///
    /// Non-finite inputs are rejected here rather than inside the models, so
    /// every candidate reports the same shape/type failures.
    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        // ---
        if features.len() != FEATURE_NAMES.len() {
            return Err(PipelineError::Prediction {
                reason: format!(
                    "feature vector has {} values, expected {}",
                    features.len(),
                    FEATURE_NAMES.len()
                ),
            });
        }
        if let Some(pos) = features.iter().position(|f| !f.is_finite()) {
            return Err(PipelineError::Prediction {
                reason: format!("non-finite value for feature '{}'", FEATURE_NAMES[pos]),
            });
        }

        match self {
            Regressor::Linear(m) => m.predict_one(features),
            Regressor::Forest(m) => m.predict_one(features),
            Regressor::GradientBoosting(m) => m.predict_one(features),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_candidate_order_is_fixed() {
        // ---
        let names: Vec<&str> = Regressor::candidates().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["linear_regression", "random_forest", "gradient_boosting"]
        );
    }

    #[test]
    fn test_wrong_width_feature_vector_is_rejected() {
        // ---
        let model = Regressor::Linear(LinearRegressor::from_weights(0.0, vec![1.0; 5]));
        assert!(matches!(
            model.predict_one(&[1.0, 2.0]),
            Err(PipelineError::Prediction { .. })
        ));
    }

    #[test]
    fn test_non_finite_feature_is_rejected() {
        // ---
        let model = Regressor::Linear(LinearRegressor::from_weights(0.0, vec![1.0; 5]));
        let features = [20.0, 60.0, f64::NAN, 4.0, 50.0];

        let err = model.predict_one(&features).unwrap_err();
        assert!(err.to_string().contains("wind_speed"));
    }

    #[test]
    fn test_winner_round_trips_through_json() {
        // ---
        let x: Vec<Vec<f64>> = (0..30)
            .map(|i| {
                let f = i as f64;
                vec![f, 50.0 - f, f / 2.0, (i % 24) as f64, 40.0 + f]
            })
            .collect();
        let y: Vec<f64> = (0..30).map(|i| 40.0 + i as f64).collect();

        let mut model = Regressor::Forest(RandomForestRegressor::new(10, RANDOM_SEED));
        model.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let restored: Regressor = serde_json::from_str(&json).unwrap();

        let probe = [5.0, 45.0, 2.5, 5.0, 45.0];
        assert_eq!(
            model.predict_one(&probe).unwrap(),
            restored.predict_one(&probe).unwrap()
        );
    }
}
