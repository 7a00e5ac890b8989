//! Order search types.

use serde::{Deserialize, Serialize};

/// ARIMA order `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

impl ArimaOrder {
    /// Create an order.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of ARMA coefficients
    pub fn arma_terms(&self) -> usize {
        self.p + self.q
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Information criterion minimized by the order search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InformationCriterion {
    /// Akaike information criterion
    #[default]
    Aic,
    /// Bayesian (Schwarz) information criterion
    Bic,
}

/// Bounds and budget of an order search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBounds {
    /// Largest AR order tried
    pub ar_max: usize,
    /// Largest MA order tried
    pub ma_max: usize,
    /// Differencing order applied to every candidate
    pub d: usize,
    /// Criterion used for ranking
    pub criterion: InformationCriterion,
    /// Maximum number of candidate fits
    pub max_iterations: usize,
    /// Optional wall-clock budget in milliseconds
    pub time_budget_ms: Option<u64>,
}

impl SearchBounds {
    /// Total number of orders inside the bounds
    pub fn candidate_count(&self) -> usize {
        (self.ar_max + 1) * (self.ma_max + 1)
    }
}

/// A candidate order with its criterion value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedOrder {
    /// Candidate order
    pub order: ArimaOrder,
    /// Criterion value (lower is better)
    pub criterion: f64,
}

/// A candidate order that failed to fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedOrder {
    /// Candidate order
    pub order: ArimaOrder,
    /// Failure description
    pub reason: String,
}

/// Outcome of an order search: ranked fits plus what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Successfully fitted orders, best first
    pub ranked: Vec<RankedOrder>,
    /// Orders that failed numerically
    pub skipped: Vec<SkippedOrder>,
    /// Whether the budget stopped the search early
    pub truncated: bool,
    /// Number of candidate fits attempted
    pub evaluated: usize,
}

impl SearchOutcome {
    /// Best-ranked order, if any candidate fitted
    pub fn best(&self) -> Option<&RankedOrder> {
        self.ranked.first()
    }
}
