//! Gradient boosting regressor.
//!
//! Sequential ensemble of shallow regression trees, each fitted to the
//! residuals of the ensemble so far. Deterministic: boosting needs no
//! sampling, so the only state is the training data itself.

use serde::{Deserialize, Serialize};

use super::tree::{TreeNode, TreeParams};
use crate::error::{PipelineError, Result};

// ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    n_estimators: usize,
    learning_rate: f64,
    params: TreeParams,
    baseline: f64,
    trees: Vec<TreeNode>,
    fitted: bool,
}

impl GradientBoostingRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64) -> Self {
        // ---
        GradientBoostingRegressor {
            n_estimators,
            learning_rate,
            // Shallow stumps-plus: depth 3 keeps each stage weak.
            params: TreeParams {
                max_depth: 3,
                ..TreeParams::default()
            },
            baseline: 0.0,
            trees: Vec::new(),
            fitted: false,
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        // ---
        if x.is_empty() {
            return Err(PipelineError::Prediction {
                reason: "boosting fit on empty design matrix".into(),
            });
        }

        self.baseline = y.iter().sum::<f64>() / y.len() as f64;

        let indices: Vec<usize> = (0..x.len()).collect();
        let mut current: Vec<f64> = vec![self.baseline; y.len()];
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let residuals: Vec<f64> = y.iter().zip(&current).map(|(t, p)| t - p).collect();

            let tree = TreeNode::grow(x, &residuals, &indices, &self.params);
            for (i, row) in x.iter().enumerate() {
                current[i] += self.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        self.trees = trees;
        self.fitted = true;
        Ok(())
    }

    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        // ---
        if !self.fitted {
            return Err(PipelineError::Prediction {
                reason: "boosting model not fitted".into(),
            });
        }

        let boost: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        Ok(self.baseline + self.learning_rate * boost)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn training_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        // ---
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..40).map(|i| 5.0 + 3.0 * i as f64).collect();
        (x, y)
    }

    #[test]
    fn test_boosting_beats_the_mean_baseline() {
        // ---
        let (x, y) = training_data();
        let mean = y.iter().sum::<f64>() / y.len() as f64;

        let mut model = GradientBoostingRegressor::new(50, 0.1);
        model.fit(&x, &y).unwrap();

        let mut model_err = 0.0;
        let mut mean_err = 0.0;
        for (row, target) in x.iter().zip(&y) {
            model_err += (model.predict_one(row).unwrap() - target).abs();
            mean_err += (mean - target).abs();
        }

        assert!(
            model_err < mean_err / 2.0,
            "boosting barely improved on the mean: {model_err} vs {mean_err}"
        );
    }

    #[test]
    fn test_fit_is_deterministic() {
        // ---
        let (x, y) = training_data();

        let mut a = GradientBoostingRegressor::new(30, 0.1);
        let mut b = GradientBoostingRegressor::new(30, 0.1);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(
            a.predict_one(&[17.0]).unwrap(),
            b.predict_one(&[17.0]).unwrap()
        );
    }

    #[test]
    fn test_unfitted_model_rejects_prediction() {
        // ---
        let model = GradientBoostingRegressor::new(10, 0.1);
        assert!(model.predict_one(&[1.0]).is_err());
    }

    #[test]
    fn test_zero_estimators_predicts_the_baseline() {
        // ---
        let (x, y) = training_data();
        let mut model = GradientBoostingRegressor::new(0, 0.1);
        model.fit(&x, &y).unwrap();

        let mean = y.iter().sum::<f64>() / y.len() as f64;
        assert_eq!(model.predict_one(&[10.0]).unwrap(), mean);
    }
}
