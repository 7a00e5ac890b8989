//! Ratecast Facade
//!
//! High-level API for interest-rate forecasting runs. Re-exports the public
//! types of the ratecast stack for convenient usage.

// Re-export everything from API (which includes SPI)
pub use ratecast_api::*;

// Re-export core modules for direct access
pub use ratecast_core::{
    arimax, causality, evaluation, features, metrics, pipeline, regression, resample, search,
    selection, source, stationarity,
};

// Re-export main types at root
pub use ratecast_core::{
    AdfTest, ApiSource, CausalityScreener, CsvFileSource, Evaluator, FeatureBuilder, FixedOrder,
    ForecastJob, GridSearch, ModelSelector, PrioritizedSource, RatePipeline, Regressor, Screening,
    StationarityAnalyzer,
};

// Re-export SPI contracts
pub use ratecast_spi::{DataSource, OrderSearch, SeriesClient};

/// Commonly used types for a forecasting run.
pub mod prelude {
    pub use ratecast_api::{
        Aggregation, Cadence, DiagnosticFlag, EvaluationMode, ExpectedSign, ForecastOutcome,
        ModelKind, RatecastError, RegressorSpec, Result, RunConfig, SeriesRequest, TimeSeries,
    };
    pub use ratecast_core::{
        CsvFileSource, ForecastJob, PrioritizedSource, RatePipeline, Regressor,
    };
    pub use ratecast_spi::DataSource;
}
