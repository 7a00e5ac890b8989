//! Bundle handed to reporting collaborators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    CausalityResult, DiagnosticFlag, EvaluationReport, FeatureSet, ModelKind, SelectedModels,
    StationarityResult,
};

/// Shape of the feature set a run was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    /// Aligned rows kept
    pub rows: usize,
    /// Rows in the aligned range before cleaning
    pub rows_before_cleaning: usize,
    /// Rows dropped for missing values
    pub dropped_rows: usize,
    /// First aligned month
    pub start: Option<NaiveDate>,
    /// Last aligned month
    pub end: Option<NaiveDate>,
    /// Candidate feature names
    pub features: Vec<String>,
}

impl From<&FeatureSet> for FeatureSummary {
    fn from(set: &FeatureSet) -> Self {
        Self {
            rows: set.len(),
            rows_before_cleaning: set.rows_before_cleaning(),
            dropped_rows: set.dropped_rows(),
            start: set.target().first_date(),
            end: set.target().last_date(),
            features: set.feature_names(),
        }
    }
}

/// Everything a run produced, for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutcome {
    /// Target series name
    pub target: String,
    /// Feature set summary
    pub features: FeatureSummary,
    /// Differencing decision for the target
    pub stationarity: StationarityResult,
    /// Screening results, ordered by feature name
    pub causality: Vec<CausalityResult>,
    /// Features that entered the challenger
    pub retained: Vec<String>,
    /// Fitted baseline and challenger
    pub models: SelectedModels,
    /// Holdout comparison
    pub evaluation: EvaluationReport,
}

impl ForecastOutcome {
    /// Declared winner
    pub fn winner(&self) -> ModelKind {
        self.evaluation.winner
    }

    /// Every soft condition of the run: dropped regressors first, then the
    /// evaluation flags.
    pub fn diagnostics(&self) -> Vec<DiagnosticFlag> {
        self.causality
            .iter()
            .filter(|r| !r.is_retained())
            .map(|r| DiagnosticFlag::RegressorDropped {
                feature: r.feature.clone(),
                decision: r.decision,
            })
            .chain(self.evaluation.flags.iter().cloned())
            .collect()
    }
}
