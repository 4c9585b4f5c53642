//! Metrics for evaluating regression models.

use crate::error::{PipelineError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Struct to hold all regression metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: f64,
}

impl RegressionMetrics {
    /// Calculate all metrics at once.
    ///
    /// # Errors
    /// `InvalidShape` if the arrays differ in length, `EmptyData` if they
    /// are empty.
    pub fn compute(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(PipelineError::InvalidShape {
                expected: y_true.len(),
                got: y_pred.len(),
            });
        }
        if y_true.is_empty() {
            return Err(PipelineError::EmptyData(
                "cannot evaluate on zero rows".to_string(),
            ));
        }

        let n = y_true.len() as f64;
        let residuals = &y_true - &y_pred;
        let mse = residuals.mapv(|r| r * r).sum() / n;
        let mae = residuals.mapv(f64::abs).sum() / n;

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r_squared: r_squared(y_true, mse * n),
        })
    }
}

/// R² = 1 - (SS_res / SS_tot)
///
/// R² is 1 for perfect prediction and can be negative if the model is worse
/// than predicting the mean.
fn r_squared(y_true: ArrayView1<'_, f64>, ss_res: f64) -> f64 {
    let mean_true = y_true.sum() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true).powi(2)).sum();

    if ss_tot == 0.0 {
        // Constant target: only an exact fit counts
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
