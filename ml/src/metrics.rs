// ml/src/metrics.rs

//! Regression quality measures reported after training.

use serde::{Deserialize, Serialize};

/// Root mean squared error over paired slices. Returns 0 for empty input.
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    (sum_sq / actual.len() as f64).sqrt()
}

/// Mean absolute error over paired slices. Returns 0 for empty input.
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let sum_abs: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum();
    sum_abs / actual.len() as f64
}

/// Coefficient of determination. Defined as 0 when `actual` is constant or
/// empty, since explained variance is meaningless there.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();
    if ss_tot <= f64::EPSILON {
        return 0.0;
    }
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    1.0 - ss_res / ss_tot
}

/// Error measures for one data split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    /// Computes all measures over paired actual/predicted slices.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        Self {
            rmse: root_mean_squared_error(actual, predicted),
            mae: mean_absolute_error(actual, predicted),
            r2: r_squared(actual, predicted),
        }
    }
}

/// Train and test measures persisted alongside the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub train_rmse: f64,
    pub test_rmse: f64,
    pub train_mae: f64,
    pub test_mae: f64,
    pub train_r2: f64,
    pub test_r2: f64,
}

impl ModelMetrics {
    pub fn from_splits(train: RegressionMetrics, test: RegressionMetrics) -> Self {
        Self {
            train_rmse: train.rmse,
            test_rmse: test.rmse,
            train_mae: train.mae,
            test_mae: test.mae,
            train_r2: train.r2,
            test_r2: test.r2,
        }
    }
}

/// On-disk report shape, keyed by the predicted quantity so the format
/// survives adding further targets later.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub wait_time: ModelMetrics,
}
