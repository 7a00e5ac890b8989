//! Causality screening outcome.

use serde::{Deserialize, Serialize};

/// Screening decision for one candidate feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalityDecision {
    /// p-value below the threshold, feature kept
    Retained,
    /// Tested but not significant, feature dropped
    Insignificant,
    /// Could not be tested, feature dropped
    Untestable,
}

impl std::fmt::Display for CausalityDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CausalityDecision::Retained => "retained",
            CausalityDecision::Insignificant => "insignificant",
            CausalityDecision::Untestable => "untestable",
        };
        write!(f, "{}", s)
    }
}

/// Result of testing whether a feature helps predict the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalityResult {
    /// Candidate feature name
    pub feature: String,
    /// Target series name
    pub target: String,
    /// Lag count of the test
    pub lag: usize,
    /// F-statistic, NaN when untestable
    pub f_statistic: f64,
    /// p-value, NaN when untestable
    pub p_value: f64,
    /// Retained or dropped
    pub decision: CausalityDecision,
    /// Why the feature could not be tested
    pub reason: Option<String>,
}

impl CausalityResult {
    /// Whether the feature survives screening
    pub fn is_retained(&self) -> bool {
        self.decision == CausalityDecision::Retained
    }
}
