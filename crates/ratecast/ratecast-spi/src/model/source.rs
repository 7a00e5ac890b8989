//! Data source request and provenance types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cadence, TimeSeries};

/// Kind of collaborator that produced a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Remote statistics API (proxy data)
    Api,
    /// Manually supplied file
    File,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Api => write!(f, "api"),
            SourceKind::File => write!(f, "file"),
        }
    }
}

/// Request for one named series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRequest {
    /// Logical series name, e.g. `TBILL_3M`
    pub name: String,
    /// Cadence the caller expects the source to declare
    pub cadence: Cadence,
    /// Inclusive start of the window
    pub start: Option<NaiveDate>,
    /// Inclusive end of the window
    pub end: Option<NaiveDate>,
}

impl SeriesRequest {
    /// Monthly request without a date window.
    pub fn monthly(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cadence: Cadence::Monthly,
            start: None,
            end: None,
        }
    }

    /// Request with a different cadence.
    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Restrict the request to a date window.
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Whether a date lies inside the requested window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// A fetched series tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcedSeries {
    /// The series itself
    pub series: TimeSeries,
    /// Provenance watermark
    pub kind: SourceKind,
    /// File path or provider series id
    pub origin: String,
    /// Publication delay suggested by the source
    pub reporting_lag_hint: Option<usize>,
}
