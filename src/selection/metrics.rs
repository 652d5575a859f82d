//! Regression evaluation metrics.

use serde::{Deserialize, Serialize};

/// Coefficient of determination.
///
/// `R² = 1 - SS_res / SS_tot`. A constant target (zero total variance)
/// scores 0.0.
///
/// # Panics
/// Panics if the slices have different lengths.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len(), "length mismatch");

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

/// Mean absolute error.
///
/// # Panics
/// Panics if the slices have different lengths or are empty.
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len(), "length mismatch");
    assert!(!y_true.is_empty(), "empty input");

    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

/// Mean squared error.
///
/// # Panics
/// Panics if the slices have different lengths or are empty.
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len(), "length mismatch");
    assert!(!y_true.is_empty(), "empty input");

    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}

/// The metric triple recorded for every tuned candidate.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RegressionReport {
    pub r2_score: f64,
    pub mean_absolute_error: f64,
    pub mean_squared_error: f64,
}

impl RegressionReport {
    /// Evaluate all three metrics at once.
    pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> Self {
        Self {
            r2_score: r2_score(y_true, y_pred),
            mean_absolute_error: mean_absolute_error(y_true, y_pred),
            mean_squared_error: mean_squared_error(y_true, y_pred),
        }
    }
}
