//! Rate forecasting error types

use thiserror::Error;

/// Errors that can occur while building features, testing and fitting models.
///
/// The first three variants are the fatal conditions of a run. The rest cover
/// bad input and the numerical failures that the order search turns into
/// skipped candidates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatecastError {
    /// Not enough aligned observations after feature construction
    #[error("Insufficient data for '{series}': need at least {required} points, got {actual}")]
    InsufficientData {
        series: String,
        required: usize,
        actual: usize,
    },

    /// Series is still non-stationary after the maximum differencing order
    #[error(
        "Series '{series}' is non-stationary after {max_order} difference(s): \
         ADF statistic {statistic:.4}, p-value {p_value:.4}"
    )]
    NonStationarity {
        series: String,
        max_order: usize,
        statistic: f64,
        p_value: f64,
    },

    /// Baseline model could not be fitted under any searched order
    #[error("Model fitting failed for '{series}' after {orders_tried} order(s): {reason}")]
    ModelFit {
        series: String,
        orders_tried: usize,
        reason: String,
    },

    /// Series violates a structural invariant (ordering, duplicates, lengths)
    #[error("Invalid series '{name}': {reason}")]
    InvalidSeries { name: String, reason: String },

    /// Invalid configuration or argument value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Data source failed to produce a series
    #[error("Data source '{source_name}' failed: {reason}")]
    Source { source_name: String, reason: String },

    /// Numerical failure inside an estimator (singular design, explosive roots)
    #[error("Numerical error: {0}")]
    Numerical(String),
}

impl RatecastError {
    /// Whether the error is one of the fatal run conditions rather than input misuse.
    pub fn is_fatal_condition(&self) -> bool {
        matches!(
            self,
            RatecastError::InsufficientData { .. }
                | RatecastError::NonStationarity { .. }
                | RatecastError::ModelFit { .. }
        )
    }
}
