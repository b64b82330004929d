//! Ordinary least squares linear regression.
//!
//! Fit via the normal equations with Gaussian elimination; five features
//! plus an intercept makes the system small enough that nothing heavier is
//! warranted.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

// ---

/// Linear model `y = w0 + w1*x1 + ... + wn*xn`.
///
/// `weights` is intercept-first and `None` until fitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegressor {
    weights: Option<Vec<f64>>,
}

impl LinearRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an already-fitted model from known weights.
    ///
    /// Used by tests and diagnostics that need a model with hand-picked
    /// behavior; `coefficients` follows the training feature order.
    pub fn from_weights(intercept: f64, coefficients: Vec<f64>) -> Self {
        // ---
        let mut weights = Vec::with_capacity(coefficients.len() + 1);
        weights.push(intercept);
        weights.extend(coefficients);
        LinearRegressor {
            weights: Some(weights),
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        // ---
        let n_features = x.first().map(Vec::len).unwrap_or(0);
        if x.is_empty() || n_features == 0 {
            return Err(PipelineError::Prediction {
                reason: "linear fit on empty design matrix".into(),
            });
        }

        // Normal equations A w = b with A = XᵀX, b = Xᵀy over the
        // intercept-augmented design matrix.
        let dim = n_features + 1;
        let mut a = vec![vec![0.0; dim]; dim];
        let mut b = vec![0.0; dim];

        for (row, &target) in x.iter().zip(y) {
            let mut augmented = Vec::with_capacity(dim);
            augmented.push(1.0);
            augmented.extend_from_slice(row);

            for i in 0..dim {
                b[i] += augmented[i] * target;
                for j in 0..dim {
                    a[i][j] += augmented[i] * augmented[j];
                }
            }
        }

        self.weights = Some(solve(a, b)?);
        Ok(())
    }

    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        // ---
        let weights = self.weights.as_ref().ok_or_else(|| PipelineError::Prediction {
            reason: "linear model not fitted".into(),
        })?;

        if features.len() + 1 != weights.len() {
            return Err(PipelineError::Prediction {
                reason: format!(
                    "feature vector has {} values, model expects {}",
                    features.len(),
                    weights.len() - 1
                ),
            });
        }

        Ok(weights[0]
            + weights[1..]
                .iter()
                .zip(features)
                .map(|(w, f)| w * f)
                .sum::<f64>())
    }
}

/// Solve `A x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    // ---
    let n = b.len();

    for col in 0..n {
        // Pivot on the largest remaining entry in this column.
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(PipelineError::Prediction {
                reason: "singular design matrix in linear fit".into(),
            });
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_recovers_exact_linear_relationship() {
        // ---
        // y = 3 + 2*x1 - 0.5*x2 over a small grid.
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                let (x1, x2) = (i as f64, j as f64);
                x.push(vec![x1, x2]);
                y.push(3.0 + 2.0 * x1 - 0.5 * x2);
            }
        }

        let mut model = LinearRegressor::new();
        model.fit(&x, &y).unwrap();

        let pred = model.predict_one(&[10.0, 4.0]).unwrap();
        assert!((pred - 21.0).abs() < 1e-8, "got {pred}");
    }

    #[test]
    fn test_unfitted_model_rejects_prediction() {
        // ---
        let model = LinearRegressor::new();
        assert!(matches!(
            model.predict_one(&[1.0, 2.0]),
            Err(PipelineError::Prediction { .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_is_a_prediction_error() {
        // ---
        let model = LinearRegressor::from_weights(1.0, vec![2.0, 3.0]);
        assert!(matches!(
            model.predict_one(&[1.0]),
            Err(PipelineError::Prediction { .. })
        ));
    }

    #[test]
    fn test_from_weights_predicts_directly() {
        // ---
        let model = LinearRegressor::from_weights(1.0, vec![0.0, 1.0]);
        let pred = model.predict_one(&[99.0, 10.0]).unwrap();
        assert_eq!(pred, 11.0);
    }

    #[test]
    fn test_singular_matrix_fails_cleanly() {
        // ---
        // Two identical columns make XᵀX singular.
        let x = vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 3.0]];
        let y = vec![1.0, 2.0, 3.0];

        let mut model = LinearRegressor::new();
        assert!(model.fit(&x, &y).is_err());
    }
}
