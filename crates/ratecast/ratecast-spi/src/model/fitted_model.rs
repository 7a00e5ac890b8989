//! Fitted model value objects.

use serde::{Deserialize, Serialize};

use super::{ArimaOrder, InformationCriterion, SkippedOrder};

/// Role of a fitted model in the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Univariate model on the target's own history
    Baseline,
    /// Model augmented with exogenous regressors
    Challenger,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Baseline => write!(f, "baseline"),
            ModelKind::Challenger => write!(f, "challenger"),
        }
    }
}

/// Fitted coefficient of one exogenous regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExogCoefficient {
    /// Feature name
    pub name: String,
    /// Raw regressor the feature came from
    pub source: String,
    /// Coefficient estimate (sign preserved)
    pub value: f64,
    /// Standard error
    pub std_error: f64,
    /// t-statistic
    pub t_statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
    /// Whether `p_value` is below the run's significance threshold
    pub significant: bool,
}

/// In-sample fit statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    /// Conditional Gaussian log-likelihood
    pub log_likelihood: f64,
    /// Akaike information criterion
    pub aic: f64,
    /// Bayesian information criterion
    pub bic: f64,
    /// Innovation variance estimate
    pub sigma2: f64,
    /// Observations entering the likelihood
    pub nobs: usize,
    /// Estimated parameters, variance included
    pub n_params: usize,
}

impl FitStatistics {
    /// Criterion value selected by `criterion`.
    pub fn criterion(&self, criterion: InformationCriterion) -> f64 {
        match criterion {
            InformationCriterion::Aic => self.aic,
            InformationCriterion::Bic => self.bic,
        }
    }
}

/// A fitted ARIMA or regressor-augmented ARIMA model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    /// Baseline or challenger
    pub kind: ModelKind,
    /// Name of the modeled series
    pub target: String,
    /// Selected order
    pub order: ArimaOrder,
    /// Intercept on the differenced scale
    pub intercept: f64,
    /// AR coefficients, lag 1 first
    pub ar: Vec<f64>,
    /// MA coefficients, lag 1 first
    pub ma: Vec<f64>,
    /// Exogenous coefficients in feature-name order
    pub exog: Vec<ExogCoefficient>,
    /// In-sample statistics
    pub stats: FitStatistics,
    /// Criterion used to pick the order
    pub criterion: InformationCriterion,
    /// Orders skipped during the search
    pub skipped_orders: Vec<SkippedOrder>,
    /// Whether the search budget cut the search short
    pub search_truncated: bool,
    /// Candidate fits attempted by the search
    pub orders_evaluated: usize,
}

impl FittedModel {
    /// Names of the exogenous features, in coefficient order
    pub fn exog_names(&self) -> Vec<String> {
        self.exog.iter().map(|c| c.name.clone()).collect()
    }

    /// Coefficient of a named feature
    pub fn exog_coefficient(&self, name: &str) -> Option<&ExogCoefficient> {
        self.exog.iter().find(|c| c.name == name)
    }

    /// Criterion value that ranked this model
    pub fn criterion_value(&self) -> f64 {
        self.stats.criterion(self.criterion)
    }
}

/// What happened to the challenger during model selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChallengerOutcome {
    /// Challenger fitted
    Fitted(FittedModel),
    /// No regressor survived screening
    NotAttempted,
    /// Every candidate order failed
    Failed {
        reason: String,
        skipped_orders: Vec<SkippedOrder>,
    },
}

impl ChallengerOutcome {
    /// Fitted challenger, if any
    pub fn model(&self) -> Option<&FittedModel> {
        match self {
            ChallengerOutcome::Fitted(model) => Some(model),
            _ => None,
        }
    }
}

/// The two models handed from selection to evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedModels {
    /// Always-present univariate model
    pub baseline: FittedModel,
    /// Regressor-augmented model status
    pub challenger: ChallengerOutcome,
}
