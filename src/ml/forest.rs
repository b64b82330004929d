//! Random forest regressor: bagged regression trees.
//!
//! Each tree is grown on a bootstrap sample drawn from a seeded RNG, so a
//! fit is fully reproducible for a given seed. Predictions average the
//! per-tree outputs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{TreeNode, TreeParams};
use crate::error::{PipelineError, Result};

// ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    params: TreeParams,
    seed: u64,
    trees: Vec<TreeNode>,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        // ---
        RandomForestRegressor {
            n_estimators,
            params: TreeParams::default(),
            seed,
            trees: Vec::new(),
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        // ---
        if x.is_empty() {
            return Err(PipelineError::Prediction {
                reason: "forest fit on empty design matrix".into(),
            });
        }

        let n = x.len();
        let mut trees = Vec::with_capacity(self.n_estimators);

        for tree_index in 0..self.n_estimators {
            // Each tree gets its own deterministic stream so the forest does
            // not depend on build order.
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(tree_index as u64));
            let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();

            trees.push(TreeNode::grow(x, y, &sample, &self.params));
        }

        self.trees = trees;
        Ok(())
    }

    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        // ---
        if self.trees.is_empty() {
            return Err(PipelineError::Prediction {
                reason: "forest model not fitted".into(),
            });
        }

        let sum: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn training_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        // ---
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 7) as f64]).collect();
        let y: Vec<f64> = (0..40).map(|i| (i as f64) * 2.0 + (i % 7) as f64).collect();
        (x, y)
    }

    #[test]
    fn test_fit_is_deterministic_for_a_seed() {
        // ---
        let (x, y) = training_data();

        let mut a = RandomForestRegressor::new(25, 42);
        let mut b = RandomForestRegressor::new(25, 42);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        for probe in [[3.0, 1.0], [20.0, 5.0], [39.0, 0.0]] {
            assert_eq!(
                a.predict_one(&probe).unwrap(),
                b.predict_one(&probe).unwrap()
            );
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        // ---
        let (x, y) = training_data();

        let mut a = RandomForestRegressor::new(25, 42);
        let mut b = RandomForestRegressor::new(25, 7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        let differs = [[3.0, 1.0], [20.0, 5.0], [39.0, 0.0]]
            .iter()
            .any(|p| a.predict_one(p).unwrap() != b.predict_one(p).unwrap());
        assert!(differs, "seeds 42 and 7 produced identical forests");
    }

    #[test]
    fn test_predictions_stay_in_target_range() {
        // ---
        let (x, y) = training_data();
        let mut model = RandomForestRegressor::new(25, 42);
        model.fit(&x, &y).unwrap();

        // Averaged leaves can never leave the observed target range.
        let pred = model.predict_one(&[15.0, 3.0]).unwrap();
        assert!(pred >= 0.0 && pred <= 84.0, "got {pred}");
    }

    #[test]
    fn test_unfitted_forest_rejects_prediction() {
        // ---
        let model = RandomForestRegressor::new(10, 42);
        assert!(model.predict_one(&[1.0, 2.0]).is_err());
    }
}
