//! Forecast accuracy metrics
//!
//! Holdout scores used to compare the baseline and challenger models.

/// Mean Absolute Error (MAE)
///
/// Average of absolute differences between forecasts and realized values.
/// NaN when the slices differ in length or are empty.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();

    sum / actual.len() as f64
}

/// Mean Squared Error (MSE)
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    sum / actual.len() as f64
}

/// Root Mean Squared Error (RMSE), on the scale of the data.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_forecast() {
        let actual = [1.0, 2.0, 3.0];
        assert_eq!(mae(&actual, &actual), 0.0);
        assert_eq!(rmse(&actual, &actual), 0.0);
    }

    #[test]
    fn test_known_values() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let predicted = [2.0, 2.0, 3.0, 2.0];
        assert!((mae(&actual, &predicted) - 0.75).abs() < 1e-12);
        assert!((mse(&actual, &predicted) - 1.25).abs() < 1e-12);
        assert!((rmse(&actual, &predicted) - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_lengths() {
        assert!(rmse(&[1.0, 2.0], &[1.0]).is_nan());
        assert!(mae(&[], &[]).is_nan());
    }
}
