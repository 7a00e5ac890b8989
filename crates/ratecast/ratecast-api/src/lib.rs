//! Rate Forecasting Consumer API
//!
//! Run configuration for rate forecasting consumers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// Re-export SPI types
pub use ratecast_spi::*;

/// How held-out timestamps are forecast during evaluation
///
/// The default scores one-step-ahead forecasts, so each held-out month is
/// predicted from realized history up to the month before it. Choose
/// `Static` to score a single multi-step forecast path from the end of the
/// training rows, which is the harder test and gives larger errors on
/// persistent series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// One-step-ahead forecasts from realized history, parameters frozen
    #[default]
    WalkForward,
    /// Multi-step forecasts from the training origin
    Static,
}

/// Configuration for one forecasting run
///
/// Every field has a default, so a partial JSON document deserializes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// p-value threshold shared by the unit-root and causality tests
    pub significance_threshold: f64,
    /// Maximum differencing order before giving up
    pub max_diff_order: usize,
    /// Largest AR order searched
    pub ar_max: usize,
    /// Largest MA order searched
    pub ma_max: usize,
    /// Trailing share of rows held out for evaluation
    pub holdout_fraction: f64,
    /// Expected coefficient sign by feature or regressor name
    pub expected_signs: BTreeMap<String, ExpectedSign>,
    /// Maximum candidate fits per order search
    pub max_search_iterations: usize,
    /// Optional wall-clock budget per order search
    pub search_time_budget_ms: Option<u64>,
    /// Minimum aligned rows required after feature construction
    pub min_observations: usize,
    /// Lag count of the causality test
    pub causality_lag: usize,
    /// Criterion ranking candidate orders
    pub information_criterion: InformationCriterion,
    /// RMSE difference treated as a tie (baseline wins ties)
    pub tie_tolerance: f64,
    /// Holdout forecasting mode
    pub evaluation_mode: EvaluationMode,
    /// Reporting lag applied when a regressor does not specify one
    pub default_reporting_lag: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            significance_threshold: 0.05,
            max_diff_order: 2,
            ar_max: 5,
            ma_max: 5,
            holdout_fraction: 0.2,
            expected_signs: BTreeMap::new(),
            max_search_iterations: 100,
            search_time_budget_ms: None,
            min_observations: 36,
            causality_lag: 2,
            information_criterion: InformationCriterion::Aic,
            tie_tolerance: 1e-9,
            evaluation_mode: EvaluationMode::WalkForward,
            default_reporting_lag: 1,
        }
    }
}

impl RunConfig {
    /// Set the significance threshold
    pub fn significance_threshold(mut self, threshold: f64) -> Self {
        self.significance_threshold = threshold;
        self
    }

    /// Set the maximum differencing order
    pub fn max_diff_order(mut self, order: usize) -> Self {
        self.max_diff_order = order;
        self
    }

    /// Set the AR and MA search bounds
    pub fn order_bounds(mut self, ar_max: usize, ma_max: usize) -> Self {
        self.ar_max = ar_max;
        self.ma_max = ma_max;
        self
    }

    /// Set the holdout fraction
    pub fn holdout_fraction(mut self, fraction: f64) -> Self {
        self.holdout_fraction = fraction;
        self
    }

    /// Declare the expected sign of a feature or regressor
    pub fn expect_sign(mut self, name: impl Into<String>, sign: ExpectedSign) -> Self {
        self.expected_signs.insert(name.into(), sign);
        self
    }

    /// Set the maximum candidate fits per search
    pub fn max_search_iterations(mut self, iterations: usize) -> Self {
        self.max_search_iterations = iterations;
        self
    }

    /// Set a wall-clock budget per search
    pub fn search_time_budget_ms(mut self, budget: u64) -> Self {
        self.search_time_budget_ms = Some(budget);
        self
    }

    /// Set the minimum number of aligned rows
    pub fn min_observations(mut self, n: usize) -> Self {
        self.min_observations = n;
        self
    }

    /// Set the causality test lag count
    pub fn causality_lag(mut self, lag: usize) -> Self {
        self.causality_lag = lag;
        self
    }

    /// Set the information criterion
    pub fn information_criterion(mut self, criterion: InformationCriterion) -> Self {
        self.information_criterion = criterion;
        self
    }

    /// Set the tie tolerance
    pub fn tie_tolerance(mut self, tolerance: f64) -> Self {
        self.tie_tolerance = tolerance;
        self
    }

    /// Set the evaluation mode
    pub fn evaluation_mode(mut self, mode: EvaluationMode) -> Self {
        self.evaluation_mode = mode;
        self
    }

    /// Set the default reporting lag
    pub fn default_reporting_lag(mut self, lag: usize) -> Self {
        self.default_reporting_lag = lag;
        self
    }

    /// Regressor spec using the default reporting lag
    pub fn regressor(&self, name: impl Into<String>) -> RegressorSpec {
        RegressorSpec::new(name, self.default_reporting_lag)
    }

    /// Search bounds for a given differencing order
    pub fn search_bounds(&self, d: usize) -> SearchBounds {
        SearchBounds {
            ar_max: self.ar_max,
            ma_max: self.ma_max,
            d,
            criterion: self.information_criterion,
            max_iterations: self.max_search_iterations,
            time_budget_ms: self.search_time_budget_ms,
        }
    }

    /// Expected sign of a feature, looked up by feature name then by source name
    pub fn expected_sign(&self, feature: &str, source: &str) -> ExpectedSign {
        self.expected_signs
            .get(feature)
            .or_else(|| self.expected_signs.get(source))
            .copied()
            .unwrap_or_default()
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &str, reason: String| RatecastError::InvalidParameter {
            name: name.to_string(),
            reason,
        };

        if !(self.significance_threshold > 0.0 && self.significance_threshold < 1.0) {
            return Err(invalid(
                "significance_threshold",
                format!("must be in (0, 1), got {}", self.significance_threshold),
            ));
        }
        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(invalid(
                "holdout_fraction",
                format!("must be in (0, 1), got {}", self.holdout_fraction),
            ));
        }
        if self.max_diff_order > 3 {
            return Err(invalid(
                "max_diff_order",
                format!("must be at most 3, got {}", self.max_diff_order),
            ));
        }
        if self.causality_lag == 0 {
            return Err(invalid("causality_lag", "must be at least 1".to_string()));
        }
        if self.max_search_iterations == 0 {
            return Err(invalid(
                "max_search_iterations",
                "must be at least 1".to_string(),
            ));
        }
        if self.search_time_budget_ms == Some(0) {
            return Err(invalid(
                "search_time_budget_ms",
                "must be positive when set".to_string(),
            ));
        }
        if self.min_observations < 2 {
            return Err(invalid(
                "min_observations",
                format!("must be at least 2, got {}", self.min_observations),
            ));
        }
        if !(self.tie_tolerance.is_finite() && self.tie_tolerance >= 0.0) {
            return Err(invalid(
                "tie_tolerance",
                format!("must be finite and non-negative, got {}", self.tie_tolerance),
            ));
        }
        if self.expected_signs.keys().any(|k| k.trim().is_empty()) {
            return Err(invalid(
                "expected_signs",
                "names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
