//! Lag-aligned feature construction.

use chrono::NaiveDate;
use ratecast_api::{
    is_missing, shift_months, Aggregation, Feature, FeatureSet, RatecastError, RegressorSpec,
    Result, RunConfig, TimeSeries,
};
use tracing::{info, warn};

use crate::resample::to_monthly;

/// A raw regressor series with its lag policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Regressor {
    pub spec: RegressorSpec,
    pub series: TimeSeries,
}

impl Regressor {
    /// Pair a spec with its series.
    pub fn new(spec: RegressorSpec, series: TimeSeries) -> Self {
        Self { spec, series }
    }
}

/// Builds the monthly, lag-aligned feature set for a target.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    min_observations: usize,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::from_config(&RunConfig::default())
    }
}

/// Month-end range `[first + shift, last + shift]` covered by a series.
fn shifted_range(series: &TimeSeries, shift: usize) -> Option<(NaiveDate, NaiveDate)> {
    let valid: Vec<NaiveDate> = series
        .points()
        .filter(|(_, v)| !is_missing(*v))
        .map(|(d, _)| d)
        .collect();
    let first = shift_months(*valid.first()?, shift as i32)?;
    let last = shift_months(*valid.last()?, shift as i32)?;
    Some((first, last))
}

fn validate_spec(spec: &RegressorSpec) -> Result<()> {
    if spec.reporting_lag == 0 && !spec.contemporaneous {
        return Err(RatecastError::InvalidParameter {
            name: spec.name.clone(),
            reason: "lag 0 requires the regressor to be flagged contemporaneous".to_string(),
        });
    }
    if let Some(lag) = spec.extra_lags.iter().find(|l| **l < spec.reporting_lag) {
        return Err(RatecastError::InvalidParameter {
            name: spec.name.clone(),
            reason: format!(
                "extra lag {} is shorter than the reporting lag {}",
                lag, spec.reporting_lag
            ),
        });
    }
    Ok(())
}

impl FeatureBuilder {
    /// Builder rejecting feature sets shorter than `min_observations` rows.
    pub fn new(min_observations: usize) -> Self {
        Self { min_observations }
    }

    /// Builder configured from a run configuration.
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.min_observations)
    }

    /// Resample, lag and align the regressors onto the target's months.
    ///
    /// The feature for regressor `r` at lag `k` takes, at target month `m`,
    /// the monthly value of `r` at `m - k`. Rows with any missing value are
    /// dropped and counted.
    pub fn build(&self, target: &TimeSeries, regressors: &[Regressor]) -> Result<FeatureSet> {
        for regressor in regressors {
            validate_spec(&regressor.spec)?;
        }

        let target_monthly = to_monthly(target, Aggregation::Last)?;
        let insufficient = |series: &str, actual: usize| RatecastError::InsufficientData {
            series: series.to_string(),
            required: self.min_observations,
            actual,
        };

        let (mut start, mut end) =
            shifted_range(&target_monthly, 0).ok_or_else(|| insufficient(target.name(), 0))?;

        let mut columns = Vec::new();
        for regressor in regressors {
            let monthly = to_monthly(&regressor.series, regressor.spec.aggregation)?;
            for lag in regressor.spec.lags() {
                let (first, last) = shifted_range(&monthly, lag)
                    .ok_or_else(|| insufficient(&regressor.spec.name, 0))?;
                start = start.max(first);
                end = end.min(last);
                columns.push((regressor.spec.name.clone(), lag, monthly.clone()));
            }
        }

        let rows: Vec<(NaiveDate, f64)> = target_monthly
            .points()
            .filter(|(d, _)| *d >= start && *d <= end)
            .collect();
        let rows_before_cleaning = rows.len();

        let mut kept_points = Vec::with_capacity(rows.len());
        let mut kept_columns: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); columns.len()];
        for (date, value) in rows {
            let lagged: Vec<f64> = columns
                .iter()
                .map(|(_, lag, monthly)| {
                    shift_months(date, -(*lag as i32))
                        .and_then(|source_date| monthly.value_at(source_date))
                        .unwrap_or(f64::NAN)
                })
                .collect();
            if is_missing(value) || lagged.iter().any(|v| is_missing(*v)) {
                continue;
            }
            kept_points.push((date, value));
            for (column, v) in kept_columns.iter_mut().zip(lagged) {
                column.push(v);
            }
        }
        let dropped_rows = rows_before_cleaning - kept_points.len();

        if dropped_rows > 0 {
            warn!(
                target = target.name(),
                dropped_rows, "Dropped rows with missing target or feature values"
            );
        }
        if kept_points.len() < self.min_observations {
            return Err(insufficient(target.name(), kept_points.len()));
        }

        let features = columns
            .into_iter()
            .zip(kept_columns)
            .map(|((source, lag, _), values)| Feature {
                name: ratecast_api::feature_name(&source, lag),
                source,
                lag,
                values,
            })
            .collect();
        let aligned = TimeSeries::monthly(target.name(), kept_points)?;
        let feature_set = FeatureSet::new(aligned, features, rows_before_cleaning, dropped_rows)?;

        info!(
            target = target.name(),
            rows = feature_set.len(),
            features = feature_set.feature_count(),
            dropped_rows,
            "Feature set built"
        );
        Ok(feature_set)
    }
}
