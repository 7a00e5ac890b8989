//! Stationarity test outcome.

use serde::{Deserialize, Serialize};

/// One unit-root test run at a given differencing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRootAttempt {
    /// Differencing order the test was run at
    pub order: usize,
    /// ADF t-statistic
    pub statistic: f64,
    /// Approximate p-value
    pub p_value: f64,
    /// Augmentation lags used in the regression
    pub used_lag: usize,
    /// Observations in the test regression
    pub nobs: usize,
}

/// Differencing order required to make a series stationary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityResult {
    /// Name of the tested series
    pub series: String,
    /// Required differencing order
    pub d: usize,
    /// Test statistic at the accepted order
    pub statistic: f64,
    /// p-value at the accepted order
    pub p_value: f64,
    /// Augmentation lags at the accepted order
    pub used_lag: usize,
    /// Regression observations at the accepted order
    pub nobs: usize,
    /// Significance threshold used for the decision
    pub threshold: f64,
    /// Every test run, in order
    pub attempts: Vec<UnitRootAttempt>,
}

impl StationarityResult {
    /// Whether the series was stationary in levels
    pub fn is_level_stationary(&self) -> bool {
        self.d == 0
    }
}
