//! Augmented Dickey-Fuller stationarity analysis.

use ratecast_api::{
    difference, RatecastError, Result, RunConfig, StationarityResult, TimeSeries, UnitRootAttempt,
};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, info, warn};

use crate::regression::{design_matrix, ols};

// MacKinnon (1994) response surface, constant-only regression, one variable.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// Outcome of a single ADF regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdfTest {
    /// t-statistic of the lagged level coefficient
    pub statistic: f64,
    /// MacKinnon approximate p-value
    pub p_value: f64,
    /// Augmentation lags chosen
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
}

/// Approximate p-value of an ADF statistic for a regression with constant.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);
    // Standard normal parameters are always valid
    Normal::new(0.0, 1.0).map_or(f64::NAN, |n| n.cdf(z))
}

/// Regressor rows `[1, y_{t-1}, dy_{t-1}, ..., dy_{t-lag}]` and responses `dy_t`
/// over the last `nobs` differences.
fn adf_design(values: &[f64], diffs: &[f64], lag: usize, nobs: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let start = diffs.len() - nobs;
    let mut rows = Vec::with_capacity(nobs);
    let mut response = Vec::with_capacity(nobs);
    for t in start..diffs.len() {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(values[t]);
        row.extend((1..=lag).map(|i| diffs[t - i]));
        rows.push(row);
        response.push(diffs[t]);
    }
    (rows, response)
}

/// Residual sum of squares, relative to the response's, below which the
/// regression is deterministic and its t-statistic meaningless.
const EXACT_FIT_TOLERANCE: f64 = 1e-20;

/// Run the ADF test with constant.
///
/// With `max_lag` unset the augmentation lag is chosen by AIC over
/// `0..=ceil(12 (n/100)^(1/4))`, every candidate fitted on the sample of the
/// largest lag, then the winning lag is refitted on its full sample.
pub fn adf_test(values: &[f64], max_lag: Option<usize>) -> Result<AdfTest> {
    let n = values.len();
    let insufficient = |required: usize| RatecastError::InsufficientData {
        series: "adf".to_string(),
        required,
        actual: n,
    };
    if n < 6 {
        return Err(insufficient(6));
    }

    let cap = (n / 2).saturating_sub(2);
    let default_lag = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lag = max_lag.unwrap_or(default_lag).min(cap);

    let diffs = difference(values, 1);

    let used_lag = if max_lag == 0 {
        0
    } else {
        let common = diffs.len() - max_lag;
        let mut best: Option<(usize, f64)> = None;
        for lag in 0..=max_lag {
            let (rows, response) = adf_design(values, &diffs, lag, common);
            let aic = match ols(&design_matrix(&rows), &response) {
                Ok(fit) => fit.aic(),
                Err(_) => continue,
            };
            if best.map_or(true, |(_, b)| aic < b) {
                best = Some((lag, aic));
            }
        }
        best.map(|(lag, _)| lag).ok_or_else(|| {
            RatecastError::Numerical("no augmentation lag produced a valid regression".to_string())
        })?
    };

    let nobs = diffs.len() - used_lag;
    let (rows, response) = adf_design(values, &diffs, used_lag, nobs);
    if nobs <= rows.first().map_or(0, |r| r.len()) {
        return Err(insufficient(used_lag + 4));
    }
    let fit = ols(&design_matrix(&rows), &response)?;
    let scale = response.iter().map(|v| v * v).sum::<f64>();
    if fit.ssr <= EXACT_FIT_TOLERANCE * scale {
        return Err(RatecastError::InvalidSeries {
            name: "adf".to_string(),
            reason: format!("ADF regression at lag {} fits exactly", used_lag),
        });
    }
    let statistic = fit.t_statistic(1);
    if !statistic.is_finite() {
        return Err(RatecastError::Numerical(
            "ADF statistic is not finite".to_string(),
        ));
    }

    Ok(AdfTest {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag,
        nobs,
    })
}

/// Determines the differencing order that makes a series stationary.
#[derive(Debug, Clone)]
pub struct StationarityAnalyzer {
    threshold: f64,
    max_diff_order: usize,
    max_lag: Option<usize>,
}

impl Default for StationarityAnalyzer {
    fn default() -> Self {
        Self::from_config(&RunConfig::default())
    }
}

impl StationarityAnalyzer {
    /// Create an analyzer with a p-value threshold and differencing cap.
    pub fn new(threshold: f64, max_diff_order: usize) -> Self {
        Self {
            threshold,
            max_diff_order,
            max_lag: None,
        }
    }

    /// Analyzer configured from a run configuration.
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.significance_threshold, config.max_diff_order)
    }

    /// Fix the largest augmentation lag instead of the default rule.
    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = Some(max_lag);
        self
    }

    /// Test levels, then successive differences, until the p-value is at or
    /// below the threshold.
    pub fn analyze(&self, series: &TimeSeries) -> Result<StationarityResult> {
        if series.missing_count() > 0 {
            return Err(RatecastError::InvalidSeries {
                name: series.name().to_string(),
                reason: format!("{} missing value(s)", series.missing_count()),
            });
        }
        if let Some(first) = series.values().first() {
            if series.values().iter().all(|v| v == first) {
                return Err(RatecastError::InvalidSeries {
                    name: series.name().to_string(),
                    reason: "series is constant".to_string(),
                });
            }
        }

        let mut attempts = Vec::with_capacity(self.max_diff_order + 1);
        for order in 0..=self.max_diff_order {
            let values = difference(series.values(), order);
            let test = adf_test(&values, self.max_lag).map_err(|e| match e {
                RatecastError::InsufficientData {
                    required, actual, ..
                } => RatecastError::InsufficientData {
                    series: series.name().to_string(),
                    required: required + order,
                    actual: actual + order,
                },
                RatecastError::InvalidSeries { reason, .. } => RatecastError::InvalidSeries {
                    name: series.name().to_string(),
                    reason: format!("difference order {}: {}", order, reason),
                },
                RatecastError::Numerical(reason) => RatecastError::InvalidSeries {
                    name: series.name().to_string(),
                    reason: format!(
                        "ADF regression at difference order {} is degenerate: {}",
                        order, reason
                    ),
                },
                other => other,
            })?;
            debug!(
                series = series.name(),
                order,
                statistic = test.statistic,
                p_value = test.p_value,
                used_lag = test.used_lag,
                "ADF test"
            );
            attempts.push(UnitRootAttempt {
                order,
                statistic: test.statistic,
                p_value: test.p_value,
                used_lag: test.used_lag,
                nobs: test.nobs,
            });

            if test.p_value <= self.threshold {
                info!(series = series.name(), d = order, p_value = test.p_value, "Series is stationary");
                return Ok(StationarityResult {
                    series: series.name().to_string(),
                    d: order,
                    statistic: test.statistic,
                    p_value: test.p_value,
                    used_lag: test.used_lag,
                    nobs: test.nobs,
                    threshold: self.threshold,
                    attempts,
                });
            }
        }

        let (statistic, p_value) = attempts
            .last()
            .map_or((f64::NAN, f64::NAN), |a| (a.statistic, a.p_value));
        warn!(
            series = series.name(),
            max_order = self.max_diff_order,
            p_value,
            "Series still non-stationary at the differencing cap"
        );
        Err(RatecastError::NonStationarity {
            series: series.name().to_string(),
            max_order: self.max_diff_order,
            statistic,
            p_value,
        })
    }
}
