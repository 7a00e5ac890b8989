//! End-to-end forecasting run.

use std::sync::Arc;

use rayon::prelude::*;
use ratecast_api::{
    FeatureSummary, ForecastOutcome, OrderSearch, Result, RunConfig, TimeSeries,
};
use tracing::{info, info_span};

use crate::causality::CausalityScreener;
use crate::evaluation::Evaluator;
use crate::features::{FeatureBuilder, Regressor};
use crate::selection::ModelSelector;
use crate::stationarity::StationarityAnalyzer;

/// Inputs of one independent run.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastJob {
    pub target: TimeSeries,
    pub regressors: Vec<Regressor>,
}

impl ForecastJob {
    /// Job for a target and its candidate regressors.
    pub fn new(target: TimeSeries, regressors: Vec<Regressor>) -> Self {
        Self { target, regressors }
    }
}

/// Wires feature construction, stationarity, screening, selection and
/// evaluation under one configuration.
#[derive(Debug, Clone)]
pub struct RatePipeline {
    config: RunConfig,
    features: FeatureBuilder,
    stationarity: StationarityAnalyzer,
    screener: CausalityScreener,
    selector: ModelSelector,
    evaluator: Evaluator,
}

impl RatePipeline {
    /// Create a pipeline after validating the configuration.
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config))
    }

    /// Pipeline with the default configuration.
    pub fn with_defaults() -> Self {
        Self::assemble(RunConfig::default())
    }

    fn assemble(config: RunConfig) -> Self {
        Self {
            features: FeatureBuilder::from_config(&config),
            stationarity: StationarityAnalyzer::from_config(&config),
            screener: CausalityScreener::from_config(&config),
            selector: ModelSelector::new(config.clone()),
            evaluator: Evaluator::new(config.clone()),
            config,
        }
    }

    /// Replace the order search strategy used for both models.
    pub fn with_strategy(mut self, strategy: Arc<dyn OrderSearch>) -> Self {
        self.selector = self.selector.with_strategy(strategy);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run every stage for one target.
    ///
    /// Stationarity and screening see the whole aligned sample; order
    /// selection sees only the training rows ahead of the holdout.
    pub fn run(&self, target: &TimeSeries, regressors: &[Regressor]) -> Result<ForecastOutcome> {
        let span = info_span!("forecast", target = target.name());
        let _guard = span.enter();

        let features = self.features.build(target, regressors)?;
        let stationarity = self.stationarity.analyze(features.target())?;
        let screening = self.screener.screen(&features, stationarity.d);
        let training = self.evaluator.training_set(&features)?;
        let models = self
            .selector
            .select(&training, stationarity.d, &screening.retained)?;
        let evaluation = self.evaluator.evaluate(&features, &models)?;

        info!(
            winner = %evaluation.winner,
            d = stationarity.d,
            retained = screening.retained.len(),
            "Run complete"
        );

        Ok(ForecastOutcome {
            target: target.name().to_string(),
            features: FeatureSummary::from(&features),
            stationarity,
            causality: screening.results,
            retained: screening.retained,
            models,
            evaluation,
        })
    }

    /// Run independent jobs in parallel, one result per job in input order.
    pub fn run_batch(&self, jobs: &[ForecastJob]) -> Vec<Result<ForecastOutcome>> {
        jobs.par_iter()
            .map(|job| self.run(&job.target, &job.regressors))
            .collect()
    }
}
