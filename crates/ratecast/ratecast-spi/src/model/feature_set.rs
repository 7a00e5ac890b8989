//! Lag-aligned regressor features sharing the target's index.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TimeSeries;
use crate::error::{RatecastError, Result};

/// One lagged regressor column aligned to the target's timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature name, e.g. `CPI_lag1`
    pub name: String,
    /// Name of the raw regressor the feature was built from
    pub source: String,
    /// Months between the regressor observation and the target timestamp
    pub lag: usize,
    /// Values, one per target timestamp
    pub values: Vec<f64>,
}

/// Target series plus named features on a common reference index.
///
/// The value of a feature at row `i` is the source regressor's monthly value at
/// `target.dates()[i] - lag` months, never later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    target: TimeSeries,
    features: BTreeMap<String, Feature>,
    rows_before_cleaning: usize,
    dropped_rows: usize,
}

impl FeatureSet {
    /// Assemble a feature set, checking every column matches the target length.
    pub fn new(
        target: TimeSeries,
        features: Vec<Feature>,
        rows_before_cleaning: usize,
        dropped_rows: usize,
    ) -> Result<Self> {
        let mut map = BTreeMap::new();
        for feature in features {
            if feature.values.len() != target.len() {
                return Err(RatecastError::InvalidSeries {
                    name: feature.name.clone(),
                    reason: format!(
                        "feature has {} values but target '{}' has {}",
                        feature.values.len(),
                        target.name(),
                        target.len()
                    ),
                });
            }
            if map.contains_key(&feature.name) {
                return Err(RatecastError::InvalidParameter {
                    name: feature.name.clone(),
                    reason: "duplicate feature name".to_string(),
                });
            }
            map.insert(feature.name.clone(), feature);
        }

        Ok(Self {
            target,
            features: map,
            rows_before_cleaning,
            dropped_rows,
        })
    }

    /// Feature set with no regressors.
    pub fn univariate(target: TimeSeries) -> Self {
        let rows = target.len();
        Self {
            target,
            features: BTreeMap::new(),
            rows_before_cleaning: rows,
            dropped_rows: 0,
        }
    }

    /// Target series
    pub fn target(&self) -> &TimeSeries {
        &self.target
    }

    /// Reference timestamps
    pub fn dates(&self) -> &[NaiveDate] {
        self.target.dates()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Whether there are no rows
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// Rows in the aligned range before missing values were dropped
    pub fn rows_before_cleaning(&self) -> usize {
        self.rows_before_cleaning
    }

    /// Rows removed because a target or feature value was missing
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Number of features
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Look up a feature by name.
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.get(name)
    }

    /// Features ordered by name.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    /// Feature names in column order.
    pub fn feature_names(&self) -> Vec<String> {
        self.features.keys().cloned().collect()
    }

    /// Feature columns in name order.
    pub fn columns(&self) -> Vec<&[f64]> {
        self.features.values().map(|f| f.values.as_slice()).collect()
    }

    /// A feature as a standalone series on the target's dates.
    pub fn feature_series(&self, name: &str) -> Option<TimeSeries> {
        let feature = self.features.get(name)?;
        let points = self
            .target
            .dates()
            .iter()
            .copied()
            .zip(feature.values.iter().copied())
            .collect();
        TimeSeries::new(feature.name.clone(), self.target.cadence(), points).ok()
    }

    /// New feature set restricted to the named features.
    pub fn select(&self, names: &[String]) -> Result<Self> {
        let mut features = BTreeMap::new();
        for name in names {
            let feature = self
                .features
                .get(name)
                .ok_or_else(|| RatecastError::InvalidParameter {
                    name: name.clone(),
                    reason: "unknown feature".to_string(),
                })?;
            features.insert(name.clone(), feature.clone());
        }
        Ok(Self {
            target: self.target.clone(),
            features,
            rows_before_cleaning: self.rows_before_cleaning,
            dropped_rows: self.dropped_rows,
        })
    }

    /// Split into leading `n` rows and the remaining rows, keeping time order.
    pub fn split_at(&self, n: usize) -> (Self, Self) {
        let n = n.min(self.len());
        let cut = |range: std::ops::Range<usize>| Self {
            target: self.target.slice(range.clone()),
            features: self
                .features
                .iter()
                .map(|(name, f)| {
                    (
                        name.clone(),
                        Feature {
                            values: f.values[range.clone()].to_vec(),
                            ..f.clone()
                        },
                    )
                })
                .collect(),
            rows_before_cleaning: range.len(),
            dropped_rows: 0,
        };
        (cut(0..n), cut(n..self.len()))
    }
}
