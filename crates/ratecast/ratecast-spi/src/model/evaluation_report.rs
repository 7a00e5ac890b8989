//! Holdout evaluation report and diagnostic flags.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ArimaOrder, CausalityDecision, ModelKind};

/// Theoretically expected direction of a regressor's effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedSign {
    /// Coefficient expected above zero
    Positive,
    /// Coefficient expected below zero
    Negative,
    /// No expectation
    #[default]
    Unknown,
}

impl ExpectedSign {
    /// Whether a fitted coefficient contradicts this expectation.
    pub fn is_violated_by(&self, coefficient: f64) -> bool {
        match self {
            ExpectedSign::Positive => coefficient < 0.0,
            ExpectedSign::Negative => coefficient > 0.0,
            ExpectedSign::Unknown => false,
        }
    }
}

/// Soft, machine-detectable condition surfaced by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum DiagnosticFlag {
    /// Feature removed by causality screening
    RegressorDropped {
        feature: String,
        decision: CausalityDecision,
    },
    /// No regressor survived screening
    ChallengerNotAttempted,
    /// Every challenger order failed to fit, or its refit failed
    ChallengerFailed { reason: String },
    /// A candidate order failed numerically and was skipped
    OrderSkipped {
        model: ModelKind,
        order: ArimaOrder,
        reason: String,
    },
    /// The search budget truncated the order search
    SearchTruncated { model: ModelKind, evaluated: usize },
    /// Fitted coefficient sign contradicts the expected sign
    SignInversion {
        feature: String,
        expected: ExpectedSign,
        fitted: f64,
    },
}

impl DiagnosticFlag {
    /// Short machine name of the flag.
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticFlag::RegressorDropped { .. } => "regressor_dropped",
            DiagnosticFlag::ChallengerNotAttempted => "challenger_not_attempted",
            DiagnosticFlag::ChallengerFailed { .. } => "challenger_failed",
            DiagnosticFlag::OrderSkipped { .. } => "order_skipped",
            DiagnosticFlag::SearchTruncated { .. } => "search_truncated",
            DiagnosticFlag::SignInversion { .. } => "sign_inversion",
        }
    }
}

/// Train/holdout split used by the evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldoutWindow {
    /// Rows used to refit the models
    pub train_len: usize,
    /// Rows scored out of sample
    pub test_len: usize,
    /// First held-out timestamp
    pub start: NaiveDate,
    /// Last held-out timestamp
    pub end: NaiveDate,
}

/// Out-of-sample score of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    /// Model role
    pub kind: ModelKind,
    /// Order that was refitted
    pub order: ArimaOrder,
    /// Root-mean-squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Forecasts, one per held-out timestamp
    pub forecasts: Vec<f64>,
}

/// Terminal artifact of a run: scores, ranking, winner and flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Split used for scoring
    pub holdout: HoldoutWindow,
    /// Realized target values over the holdout
    pub actuals: Vec<f64>,
    /// Scores of every evaluated model
    pub scores: Vec<ModelScore>,
    /// Models ordered best first
    pub ranking: Vec<ModelKind>,
    /// Declared winner
    pub winner: ModelKind,
    /// Baseline RMSE minus challenger RMSE, when both were scored
    pub improvement: Option<f64>,
    /// Soft conditions detected during selection and evaluation
    pub flags: Vec<DiagnosticFlag>,
}

impl EvaluationReport {
    /// Score of a given model
    pub fn score(&self, kind: ModelKind) -> Option<&ModelScore> {
        self.scores.iter().find(|s| s.kind == kind)
    }

    /// Whether a flag with the given code is present
    pub fn has_flag(&self, code: &str) -> bool {
        self.flags.iter().any(|f| f.code() == code)
    }

    /// Sign-inversion flags only
    pub fn sign_inversions(&self) -> Vec<&DiagnosticFlag> {
        self.flags
            .iter()
            .filter(|f| matches!(f, DiagnosticFlag::SignInversion { .. }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_sign_violation() {
        assert!(ExpectedSign::Positive.is_violated_by(-0.1));
        assert!(!ExpectedSign::Positive.is_violated_by(0.0));
        assert!(ExpectedSign::Negative.is_violated_by(0.3));
        assert!(!ExpectedSign::Unknown.is_violated_by(-5.0));
    }

    #[test]
    fn test_flag_codes() {
        let flag = DiagnosticFlag::SignInversion {
            feature: "FED_lag1".to_string(),
            expected: ExpectedSign::Positive,
            fitted: -0.2,
        };
        assert_eq!(flag.code(), "sign_inversion");
        assert_eq!(
            DiagnosticFlag::ChallengerNotAttempted.code(),
            "challenger_not_attempted"
        );
    }

    #[test]
    fn test_flag_serializes_with_tag() {
        let json = serde_json::to_string(&DiagnosticFlag::ChallengerNotAttempted).unwrap();
        assert_eq!(json, r#"{"flag":"challenger_not_attempted"}"#);
    }
}
