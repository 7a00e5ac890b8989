//! Order search strategy trait.

use crate::error::Result;
use crate::model::{SearchBounds, SearchOutcome};

/// Strategy that ranks candidate ARIMA orders for a target and optional
/// exogenous columns.
///
/// `target` is in levels; differencing by `bounds.d` is the strategy's job.
/// Candidates that fail numerically are reported as skipped, not as errors.
pub trait OrderSearch: Send + Sync {
    /// Strategy name.
    fn name(&self) -> &str;

    /// Rank candidate orders, best first.
    fn rank(&self, target: &[f64], exog: &[&[f64]], bounds: &SearchBounds) -> Result<SearchOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArimaOrder, InformationCriterion, RankedOrder};

    /// Mock implementation: ranks pure AR orders by their order
    struct ArOnly;

    impl OrderSearch for ArOnly {
        fn name(&self) -> &str {
            "ar-only"
        }

        fn rank(&self, _target: &[f64], _exog: &[&[f64]], bounds: &SearchBounds) -> Result<SearchOutcome> {
            let ranked = (0..=bounds.ar_max)
                .map(|p| RankedOrder {
                    order: ArimaOrder::new(p, bounds.d, 0),
                    criterion: p as f64,
                })
                .collect::<Vec<_>>();
            Ok(SearchOutcome {
                evaluated: ranked.len(),
                ranked,
                skipped: Vec::new(),
                truncated: false,
            })
        }
    }

    #[test]
    fn test_strategy_as_trait_object() {
        let strategy: Box<dyn OrderSearch> = Box::new(ArOnly);
        let bounds = SearchBounds {
            ar_max: 3,
            ma_max: 0,
            d: 1,
            criterion: InformationCriterion::Aic,
            max_iterations: 10,
            time_budget_ms: None,
        };
        let outcome = strategy.rank(&[1.0, 2.0], &[], &bounds).unwrap();
        assert_eq!(strategy.name(), "ar-only");
        assert_eq!(outcome.evaluated, 4);
        assert_eq!(outcome.best().unwrap().order, ArimaOrder::new(0, 1, 0));
    }
}
