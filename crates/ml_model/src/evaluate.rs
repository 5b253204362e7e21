//! Regression metrics for trained models.

/// Standard regression metrics over a prediction set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetrics {
    /// Mean squared error.
    pub mse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Coefficient of determination.
    pub r2: f64,
}

/// Computes regression metrics for predictions against ground truth.
///
/// A constant ground-truth vector has zero total variance; `r2` is then 1.0
/// for a perfect fit and 0.0 otherwise.
///
/// # Panics
///
/// Panics if the slices differ in length or are empty; callers produce both
/// from the same test partition.
#[must_use]
pub fn evaluate_performance(y_true: &[f64], y_pred: &[f32]) -> RegressionMetrics {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "prediction/ground-truth length mismatch"
    );
    assert!(!y_true.is_empty(), "cannot evaluate an empty prediction set");

    let n = y_true.len() as f64;

    let mut squared_error = 0.0;
    let mut absolute_error = 0.0;
    for (&truth, &pred) in y_true.iter().zip(y_pred) {
        let residual = truth - f64::from(pred);
        squared_error += residual * residual;
        absolute_error += residual.abs();
    }

    let mse = squared_error / n;
    let mae = absolute_error / n;

    let mean_true = y_true.iter().sum::<f64>() / n;
    let ss_tot: f64 = y_true
        .iter()
        .map(|&truth| (truth - mean_true) * (truth - mean_true))
        .sum();

    let r2 = if ss_tot == 0.0 {
        if squared_error == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - squared_error / ss_tot
    };

    RegressionMetrics { mse, mae, r2 }
}
