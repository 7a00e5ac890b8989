//! Order search strategies.

use std::time::{Duration, Instant};

use ratecast_api::{
    ArimaOrder, OrderSearch, RankedOrder, RatecastError, Result, SearchBounds, SearchOutcome,
    SkippedOrder,
};
use tracing::debug;

use crate::arimax;

/// Candidate orders inside the bounds, simplest first (by `p + q`, then `p`).
pub fn candidate_orders(bounds: &SearchBounds) -> Vec<ArimaOrder> {
    let mut orders: Vec<ArimaOrder> = (0..=bounds.ar_max)
        .flat_map(|p| (0..=bounds.ma_max).map(move |q| ArimaOrder::new(p, bounds.d, q)))
        .collect();
    orders.sort_by_key(|o| (o.arma_terms(), o.p));
    orders
}

/// Differenced index from which every candidate's likelihood is evaluated.
pub fn common_sample_start(bounds: &SearchBounds) -> usize {
    bounds.ar_max.max(bounds.ma_max)
}

/// Fit one candidate and file it as ranked or skipped.
fn try_order(
    target: &[f64],
    exog: &[&[f64]],
    order: ArimaOrder,
    bounds: &SearchBounds,
    outcome: &mut SearchOutcome,
) {
    outcome.evaluated += 1;
    match arimax::fit(target, exog, order, common_sample_start(bounds)) {
        Ok(fit) => {
            let criterion = fit.stats.criterion(bounds.criterion);
            debug!(%order, criterion, "Candidate fitted");
            outcome.ranked.push(RankedOrder { order, criterion });
        }
        Err(e) => {
            debug!(%order, error = %e, "Candidate skipped");
            outcome.skipped.push(SkippedOrder {
                order,
                reason: e.to_string(),
            });
        }
    }
}

/// Rank by criterion; the stable sort keeps simpler orders first on ties.
fn sort_ranked(ranked: &mut [RankedOrder]) {
    ranked.sort_by(|a, b| a.criterion.total_cmp(&b.criterion));
}

/// Exhaustive search over the bounds in order of increasing complexity.
///
/// Stops early once `max_iterations` candidates were tried or the optional
/// time budget is spent; the outcome is then marked truncated.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridSearch;

impl GridSearch {
    /// Create a grid search.
    pub fn new() -> Self {
        Self
    }
}

impl OrderSearch for GridSearch {
    fn name(&self) -> &str {
        "grid"
    }

    fn rank(&self, target: &[f64], exog: &[&[f64]], bounds: &SearchBounds) -> Result<SearchOutcome> {
        if bounds.max_iterations == 0 {
            return Err(RatecastError::InvalidParameter {
                name: "max_iterations".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let started = Instant::now();
        let budget = bounds.time_budget_ms.map(Duration::from_millis);
        let mut outcome = SearchOutcome::default();

        for order in candidate_orders(bounds) {
            if outcome.evaluated >= bounds.max_iterations
                || budget.map_or(false, |b| started.elapsed() >= b)
            {
                outcome.truncated = true;
                break;
            }
            try_order(target, exog, order, bounds, &mut outcome);
        }

        sort_ranked(&mut outcome.ranked);
        Ok(outcome)
    }
}

/// Stub strategy that always proposes a single `(p, q)` pair.
#[derive(Debug, Clone, Copy)]
pub struct FixedOrder {
    p: usize,
    q: usize,
}

impl FixedOrder {
    /// Propose ARIMA(p, d, q) with `d` taken from the bounds.
    pub fn new(p: usize, q: usize) -> Self {
        Self { p, q }
    }
}

impl OrderSearch for FixedOrder {
    fn name(&self) -> &str {
        "fixed"
    }

    fn rank(&self, target: &[f64], exog: &[&[f64]], bounds: &SearchBounds) -> Result<SearchOutcome> {
        let mut outcome = SearchOutcome::default();
        let order = ArimaOrder::new(self.p, bounds.d, self.q);
        try_order(target, exog, order, bounds, &mut outcome);
        Ok(outcome)
    }
}
