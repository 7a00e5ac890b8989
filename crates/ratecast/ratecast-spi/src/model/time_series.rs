//! Time series value type and calendar helpers.

use std::ops::Range;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{RatecastError, Result};

/// Sampling cadence declared by a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// Daily observations (business or calendar days)
    Daily,
    /// Weekly observations
    Weekly,
    /// Monthly observations
    Monthly,
    /// Quarterly observations
    Quarterly,
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Cadence::Daily => "Daily",
            Cadence::Weekly => "Weekly",
            Cadence::Monthly => "Monthly",
            Cadence::Quarterly => "Quarterly",
        };
        write!(f, "{}", s)
    }
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Month-end date `months` months away from the month containing `date`.
pub fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    let shifted = if months >= 0 {
        first.checked_add_months(Months::new(months as u32))?
    } else {
        first.checked_sub_months(Months::new(months.unsigned_abs()))?
    };
    Some(month_end(shifted))
}

/// Whether a value marks a missing observation.
#[inline]
pub fn is_missing(value: f64) -> bool {
    !value.is_finite()
}

/// Apply `order` successive first differences to a slice of values.
///
/// Returns `len - order` values (empty when the input is too short). Missing
/// values propagate into every difference that touches them.
pub fn difference(values: &[f64], order: usize) -> Vec<f64> {
    let mut result = values.to_vec();
    for _ in 0..order {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Immutable, strictly increasing sequence of dated observations.
///
/// Derived series (differences, slices, renames) are new instances; nothing
/// mutates an existing series. Monthly series carry month-end dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    name: String,
    cadence: Cadence,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series from `(date, value)` points.
    ///
    /// Monthly dates are normalized to month-end before validation. Fails with
    /// [`RatecastError::InvalidSeries`] on duplicate or decreasing dates.
    pub fn new(
        name: impl Into<String>,
        cadence: Cadence,
        points: Vec<(NaiveDate, f64)>,
    ) -> Result<Self> {
        let name = name.into();
        let (mut dates, values): (Vec<NaiveDate>, Vec<f64>) = points.into_iter().unzip();
        if cadence == Cadence::Monthly {
            dates.iter_mut().for_each(|d| *d = month_end(*d));
        }

        if let Some(i) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(RatecastError::InvalidSeries {
                name,
                reason: format!(
                    "timestamps must be strictly increasing ({} followed by {})",
                    dates[i],
                    dates[i + 1]
                ),
            });
        }

        Ok(Self {
            name,
            cadence,
            dates,
            values,
        })
    }

    /// Create a monthly series from `(date, value)` points.
    pub fn monthly(name: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        Self::new(name, Cadence::Monthly, points)
    }

    /// Create a contiguous monthly series starting at the month of `start`.
    pub fn from_values(name: impl Into<String>, start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        let mut points = Vec::with_capacity(values.len());
        for (i, value) in values.into_iter().enumerate() {
            let date = shift_months(start, i as i32).ok_or_else(|| RatecastError::InvalidSeries {
                name: name.clone(),
                reason: format!("month offset {} from {} is out of range", i, start),
            })?;
            points.push((date, value));
        }
        Self::monthly(name, points)
    }

    /// Series name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared cadence
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Number of observations (missing ones included)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no observations
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Observation dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observation values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// First observation date
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last observation date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Iterate over `(date, value)` pairs in order.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Value observed exactly at `date`, if any.
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|idx| self.values[idx])
    }

    /// Number of missing (non-finite) values.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| is_missing(**v)).count()
    }

    /// Same observations under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// `order`-th difference as a new series dated at the later observation.
    pub fn difference(&self, order: usize) -> Self {
        let values = difference(&self.values, order);
        let dates = self.dates[self.dates.len() - values.len()..].to_vec();
        Self {
            name: self.name.clone(),
            cadence: self.cadence,
            dates,
            values,
        }
    }

    /// Sub-series over an index range, clamped to the series bounds.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        Self {
            name: self.name.clone(),
            cadence: self.cadence,
            dates: self.dates[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        }
    }
}
