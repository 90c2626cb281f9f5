//! Regression evaluation metrics

use crate::error::{MangaError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Metrics for a regression model on a held-out set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// R-squared
    pub r2: f64,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Compute regression metrics. R² is 0 when the targets have no variance.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(MangaError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(MangaError::ValidationError(
                "cannot evaluate on an empty set".to_string(),
            ));
        }

        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let mse = ss_res / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let y_mean = y_true.sum() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2,
            n_samples: y_true.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regression_metrics() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.0, 2.9, 4.1, 5.0];

        let metrics = RegressionMetrics::compute(&y_true, &y_pred).unwrap();

        assert!((metrics.mse - 0.006).abs() < 1e-9);
        assert!((metrics.rmse - 0.006f64.sqrt()).abs() < 1e-9);
        assert!(metrics.r2 > 0.99);
        assert_eq!(metrics.n_samples, 5);
    }

    #[test]
    fn test_perfect_and_constant() {
        let y = array![3.0, 3.0, 3.0];
        let metrics = RegressionMetrics::compute(&y, &y).unwrap();
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.r2, 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        let err = RegressionMetrics::compute(&array![1.0, 2.0], &array![1.0]).unwrap_err();
        assert!(matches!(err, MangaError::ShapeError { .. }));
    }
}
