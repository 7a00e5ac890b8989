//! Candidate regressor description.

use serde::{Deserialize, Serialize};

/// How observations inside one month collapse to a single monthly value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Last observation of the month
    #[default]
    Last,
    /// Mean of the month's observations
    Mean,
}

/// A candidate regressor and its publication-delay policy.
///
/// `reporting_lag` is the number of months between an observation's date and
/// the moment it is known. A lag of zero is only accepted when the regressor
/// is flagged `contemporaneous`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressorSpec {
    /// Regressor name, also the stem of its feature names
    pub name: String,
    /// Publication delay in months
    pub reporting_lag: usize,
    /// Further lags to carry as separate features (each >= `reporting_lag`)
    #[serde(default)]
    pub extra_lags: Vec<usize>,
    /// Monthly aggregation policy
    #[serde(default)]
    pub aggregation: Aggregation,
    /// Explicit justification that the value is known within its own month
    #[serde(default)]
    pub contemporaneous: bool,
}

impl RegressorSpec {
    /// Regressor with the given reporting lag and last-value aggregation.
    pub fn new(name: impl Into<String>, reporting_lag: usize) -> Self {
        Self {
            name: name.into(),
            reporting_lag,
            extra_lags: Vec::new(),
            aggregation: Aggregation::Last,
            contemporaneous: false,
        }
    }

    /// Set the monthly aggregation policy.
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Carry an additional lag as its own feature.
    pub fn with_extra_lag(mut self, lag: usize) -> Self {
        if lag != self.reporting_lag && !self.extra_lags.contains(&lag) {
            self.extra_lags.push(lag);
            self.extra_lags.sort_unstable();
        }
        self
    }

    /// Declare the regressor as known within its own month.
    pub fn contemporaneous(mut self) -> Self {
        self.contemporaneous = true;
        self
    }

    /// All lags this regressor contributes, smallest first.
    pub fn lags(&self) -> Vec<usize> {
        let mut lags = vec![self.reporting_lag];
        lags.extend(self.extra_lags.iter().copied());
        lags.sort_unstable();
        lags.dedup();
        lags
    }

    /// Feature name for one of this regressor's lags, e.g. `CPI_lag1`.
    pub fn feature_name(&self, lag: usize) -> String {
        feature_name(&self.name, lag)
    }
}

/// Feature name for a regressor at a given lag.
pub fn feature_name(regressor: &str, lag: usize) -> String {
    format!("{}_lag{}", regressor, lag)
}
