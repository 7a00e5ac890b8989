//! Baseline and challenger model selection.

use std::sync::Arc;

use ratecast_api::{
    ChallengerOutcome, ExogCoefficient, FeatureSet, FittedModel, ModelKind, OrderSearch,
    RatecastError, Result, RunConfig, SearchBounds, SelectedModels, SkippedOrder,
};
use tracing::{info, warn};

use crate::arimax;
use crate::search::{common_sample_start, GridSearch};

/// Why no order could be fitted for one model.
struct SelectionFailure {
    reason: String,
    skipped: Vec<SkippedOrder>,
    orders_tried: usize,
}

/// Fits the univariate baseline and the regressor-augmented challenger with a
/// shared order search strategy.
#[derive(Clone)]
pub struct ModelSelector {
    config: RunConfig,
    strategy: Arc<dyn OrderSearch>,
}

impl std::fmt::Debug for ModelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSelector")
            .field("strategy", &self.strategy.name())
            .field("ar_max", &self.config.ar_max)
            .field("ma_max", &self.config.ma_max)
            .finish()
    }
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

impl ModelSelector {
    /// Selector using an exhaustive grid search.
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            strategy: Arc::new(GridSearch::new()),
        }
    }

    /// Replace the order search strategy.
    pub fn with_strategy(mut self, strategy: Arc<dyn OrderSearch>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Name of the order search strategy
    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Fit both models on the feature set.
    ///
    /// Fails with `ModelFit` only when no baseline order can be fitted. The
    /// challenger is not attempted without retained features, and its failure
    /// is reported in the outcome rather than as an error.
    pub fn select(&self, features: &FeatureSet, d: usize, retained: &[String]) -> Result<SelectedModels> {
        let bounds = self.config.search_bounds(d);
        let target = features.target();

        let baseline = self
            .fit_kind(ModelKind::Baseline, features, &[], &bounds)
            .map_err(|failure| RatecastError::ModelFit {
                series: target.name().to_string(),
                orders_tried: failure.orders_tried,
                reason: failure.reason,
            })?;

        let challenger = if retained.is_empty() {
            info!(target = target.name(), "No retained regressors, challenger not attempted");
            ChallengerOutcome::NotAttempted
        } else {
            match self.fit_kind(ModelKind::Challenger, features, retained, &bounds) {
                Ok(model) => ChallengerOutcome::Fitted(model),
                Err(failure) => {
                    warn!(
                        target = target.name(),
                        reason = %failure.reason,
                        "Challenger failed on every order"
                    );
                    ChallengerOutcome::Failed {
                        reason: failure.reason,
                        skipped_orders: failure.skipped,
                    }
                }
            }
        };

        Ok(SelectedModels {
            baseline,
            challenger,
        })
    }

    fn fit_kind(
        &self,
        kind: ModelKind,
        features: &FeatureSet,
        exog_names: &[String],
        bounds: &SearchBounds,
    ) -> std::result::Result<FittedModel, SelectionFailure> {
        let target = features.target();
        let selected = features.select(exog_names).map_err(|e| SelectionFailure {
            reason: e.to_string(),
            skipped: Vec::new(),
            orders_tried: 0,
        })?;
        let columns = selected.columns();

        let outcome = self
            .strategy
            .rank(target.values(), &columns, bounds)
            .map_err(|e| SelectionFailure {
                reason: e.to_string(),
                skipped: Vec::new(),
                orders_tried: 0,
            })?;
        if outcome.truncated {
            warn!(%kind, evaluated = outcome.evaluated, "Order search truncated by its budget");
        }

        let mut skipped = outcome.skipped.clone();
        for candidate in &outcome.ranked {
            let fit = match arimax::fit(
                target.values(),
                &columns,
                candidate.order,
                common_sample_start(bounds),
            ) {
                Ok(fit) => fit,
                Err(e) => {
                    skipped.push(SkippedOrder {
                        order: candidate.order,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for skip in &skipped {
                warn!(%kind, order = %skip.order, reason = %skip.reason, "Order skipped");
            }

            let exog = selected
                .features()
                .zip(&fit.exog)
                .map(|(feature, estimate)| ExogCoefficient {
                    name: feature.name.clone(),
                    source: feature.source.clone(),
                    value: estimate.value,
                    std_error: estimate.std_error,
                    t_statistic: estimate.t_statistic,
                    p_value: estimate.p_value,
                    significant: estimate.p_value < self.config.significance_threshold,
                })
                .collect();

            info!(
                %kind,
                order = %fit.order,
                criterion = fit.stats.criterion(bounds.criterion),
                evaluated = outcome.evaluated,
                "Model selected"
            );
            return Ok(FittedModel {
                kind,
                target: target.name().to_string(),
                order: fit.order,
                intercept: fit.intercept,
                ar: fit.ar,
                ma: fit.ma,
                exog,
                stats: fit.stats,
                criterion: bounds.criterion,
                skipped_orders: skipped,
                search_truncated: outcome.truncated,
                orders_evaluated: outcome.evaluated,
            });
        }

        let reason = skipped
            .last()
            .map(|s| format!("last failure at {}: {}", s.order, s.reason))
            .unwrap_or_else(|| "no candidate order was evaluated".to_string());
        Err(SelectionFailure {
            reason,
            skipped,
            orders_tried: outcome.evaluated,
        })
    }
}
