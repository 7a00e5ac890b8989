//! Ratecast Core
//!
//! Estimators and pipeline stages for forecasting an interest rate from
//! macroeconomic regressors: feature construction, unit-root testing,
//! causality screening, ARIMAX order selection and holdout evaluation.

pub mod arimax;
pub mod causality;
pub mod evaluation;
pub mod features;
pub mod metrics;
pub mod pipeline;
pub mod regression;
pub mod resample;
pub mod search;
pub mod selection;
pub mod source;
pub mod stationarity;

#[cfg(test)]
mod testing;

// Re-export SPI/API types for implementations
pub use ratecast_api::{
    DataSource, OrderSearch, RatecastError, Result, RunConfig, SeriesClient,
};

// Re-export main types
pub use causality::{CausalityScreener, Screening};
pub use evaluation::Evaluator;
pub use features::{FeatureBuilder, Regressor};
pub use pipeline::{ForecastJob, RatePipeline};
pub use search::{FixedOrder, GridSearch};
pub use selection::ModelSelector;
pub use source::{ApiSource, CsvFileSource, PrioritizedSource};
pub use stationarity::{AdfTest, StationarityAnalyzer};
