//! Value types shared by every stage of a forecasting run.

mod causality_result;
mod evaluation_report;
mod feature_set;
mod fitted_model;
mod forecast_outcome;
mod regressor;
mod search;
mod source;
mod stationarity_result;
mod time_series;

pub use causality_result::{CausalityDecision, CausalityResult};
pub use evaluation_report::{
    DiagnosticFlag, EvaluationReport, ExpectedSign, HoldoutWindow, ModelScore,
};
pub use feature_set::{Feature, FeatureSet};
pub use fitted_model::{
    ChallengerOutcome, ExogCoefficient, FitStatistics, FittedModel, ModelKind, SelectedModels,
};
pub use forecast_outcome::{FeatureSummary, ForecastOutcome};
pub use regressor::{feature_name, Aggregation, RegressorSpec};
pub use search::{
    ArimaOrder, InformationCriterion, RankedOrder, SearchBounds, SearchOutcome, SkippedOrder,
};
pub use source::{SeriesRequest, SourceKind, SourcedSeries};
pub use stationarity_result::{StationarityResult, UnitRootAttempt};
pub use time_series::{difference, is_missing, month_end, shift_months, Cadence, TimeSeries};
