//! Holdout evaluation of the baseline against the challenger.

use ratecast_api::{
    ChallengerOutcome, DiagnosticFlag, EvaluationMode, EvaluationReport, FeatureSet, FittedModel,
    HoldoutWindow, ModelKind, ModelScore, RatecastError, Result, RunConfig, SelectedModels,
};
use tracing::{info, warn};

use crate::arimax;
use crate::metrics::{mae, rmse};

/// Scores both models on a trailing holdout and declares a winner.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: RunConfig,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

impl Evaluator {
    /// Evaluator using the holdout, tie and sign settings of `config`.
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Rows held out for a feature set of `n` rows: `ceil(n * fraction)`,
    /// at least one.
    pub fn holdout_len(&self, n: usize) -> usize {
        ((n as f64 * self.config.holdout_fraction).ceil() as usize).max(1)
    }

    /// Number of leading rows used for order selection and fitting.
    ///
    /// Fails with `InsufficientData` when the holdout would leave no training
    /// rows.
    pub fn train_len(&self, features: &FeatureSet) -> Result<usize> {
        let n = features.len();
        let test_len = self.holdout_len(n);
        if test_len >= n {
            return Err(RatecastError::InsufficientData {
                series: features.target().name().to_string(),
                required: test_len + 1,
                actual: n,
            });
        }
        Ok(n - test_len)
    }

    /// Leading rows the models may be selected and fitted on.
    pub fn training_set(&self, features: &FeatureSet) -> Result<FeatureSet> {
        let train_len = self.train_len(features)?;
        Ok(features.split_at(train_len).0)
    }

    /// Refit a model's order on the training rows and forecast the holdout.
    fn score(&self, features: &FeatureSet, model: &FittedModel, train_len: usize) -> Result<ModelScore> {
        let selected = features.select(&model.exog_names())?;
        let columns = selected.columns();
        let target = features.target().values();
        let train_columns: Vec<&[f64]> = columns.iter().map(|c| &c[..train_len]).collect();

        let refit = arimax::fit(&target[..train_len], &train_columns, model.order, 0)?;
        let forecasts = match self.config.evaluation_mode {
            EvaluationMode::WalkForward => refit.forecast_walk_forward(target, &columns, train_len)?,
            EvaluationMode::Static => refit.forecast_static(target, &columns, train_len)?,
        };
        let actuals = &target[train_len..];

        Ok(ModelScore {
            kind: model.kind,
            order: model.order,
            rmse: rmse(actuals, &forecasts),
            mae: mae(actuals, &forecasts),
            forecasts,
        })
    }

    /// Sign and search flags carried by a fitted model.
    fn model_flags(&self, model: &FittedModel, flags: &mut Vec<DiagnosticFlag>) {
        flags.extend(model.skipped_orders.iter().map(|s| DiagnosticFlag::OrderSkipped {
            model: model.kind,
            order: s.order,
            reason: s.reason.clone(),
        }));
        if model.search_truncated {
            flags.push(DiagnosticFlag::SearchTruncated {
                model: model.kind,
                evaluated: model.orders_evaluated,
            });
        }
        for coefficient in &model.exog {
            let expected = self
                .config
                .expected_sign(&coefficient.name, &coefficient.source);
            if expected.is_violated_by(coefficient.value) {
                warn!(
                    feature = %coefficient.name,
                    fitted = coefficient.value,
                    "Coefficient sign contradicts expectation"
                );
                flags.push(DiagnosticFlag::SignInversion {
                    feature: coefficient.name.clone(),
                    expected,
                    fitted: coefficient.value,
                });
            }
        }
    }

    /// Hold out the trailing rows, score both models and rank them.
    ///
    /// `models` should come from [`Evaluator::training_set`] so that neither
    /// the orders nor the coefficients see the holdout. Lower RMSE wins; a
    /// difference within the tie tolerance goes to the baseline. A challenger whose training refit fails is flagged and left
    /// unscored.
    pub fn evaluate(&self, features: &FeatureSet, models: &SelectedModels) -> Result<EvaluationReport> {
        let n = features.len();
        let train_len = self.train_len(features)?;
        let test_len = n - train_len;
        let dates = features.dates();
        let holdout = HoldoutWindow {
            train_len,
            test_len,
            start: dates[train_len],
            end: dates[n - 1],
        };

        let mut flags = Vec::new();
        self.model_flags(&models.baseline, &mut flags);

        let baseline = self
            .score(features, &models.baseline, train_len)
            .map_err(|e| RatecastError::ModelFit {
                series: features.target().name().to_string(),
                orders_tried: 1,
                reason: format!("baseline refit on training rows failed: {}", e),
            })?;

        let challenger = match &models.challenger {
            ChallengerOutcome::Fitted(model) => {
                self.model_flags(model, &mut flags);
                match self.score(features, model, train_len) {
                    Ok(score) => Some(score),
                    Err(e) => {
                        warn!(error = %e, "Challenger refit on training rows failed");
                        flags.push(DiagnosticFlag::ChallengerFailed {
                            reason: format!("refit on training rows failed: {}", e),
                        });
                        None
                    }
                }
            }
            ChallengerOutcome::NotAttempted => {
                flags.push(DiagnosticFlag::ChallengerNotAttempted);
                None
            }
            ChallengerOutcome::Failed {
                reason,
                skipped_orders,
            } => {
                flags.extend(skipped_orders.iter().map(|s| DiagnosticFlag::OrderSkipped {
                    model: ModelKind::Challenger,
                    order: s.order,
                    reason: s.reason.clone(),
                }));
                flags.push(DiagnosticFlag::ChallengerFailed {
                    reason: reason.clone(),
                });
                None
            }
        };

        let improvement = challenger.as_ref().map(|c| baseline.rmse - c.rmse);
        let challenger_wins = improvement.map_or(false, |i| i > self.config.tie_tolerance);
        let (winner, ranking) = match (&challenger, challenger_wins) {
            (Some(_), true) => (
                ModelKind::Challenger,
                vec![ModelKind::Challenger, ModelKind::Baseline],
            ),
            (Some(_), false) => (
                ModelKind::Baseline,
                vec![ModelKind::Baseline, ModelKind::Challenger],
            ),
            (None, _) => (ModelKind::Baseline, vec![ModelKind::Baseline]),
        };

        info!(
            %winner,
            baseline_rmse = baseline.rmse,
            challenger_rmse = ?challenger.as_ref().map(|c| c.rmse),
            flags = flags.len(),
            "Evaluation complete"
        );

        let mut scores = vec![baseline];
        scores.extend(challenger);
        Ok(EvaluationReport {
            holdout,
            actuals: features.target().values()[train_len..].to_vec(),
            scores,
            ranking,
            winner,
            improvement,
            flags,
        })
    }
}
