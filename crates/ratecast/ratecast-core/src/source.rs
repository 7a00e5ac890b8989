//! Data source implementations.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ratecast_api::{
    DataSource, RatecastError, Result, SeriesClient, SeriesRequest, SourceKind, SourcedSeries,
    TimeSeries,
};
use tracing::{debug, info, warn};

fn source_error(source_name: &str, reason: impl Into<String>) -> RatecastError {
    RatecastError::Source {
        source_name: source_name.to_string(),
        reason: reason.into(),
    }
}

/// Reads `<dir>/<name>.csv` files with a `date,value` header.
///
/// Dates are ISO `YYYY-MM-DD`; a blank or `.` value marks a missing
/// observation. Extra columns are ignored.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    dir: PathBuf,
}

impl CsvFileSource {
    /// Source over a directory of CSV files.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File path for a series name
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", name))
    }

    fn read(&self, path: &Path, request: &SeriesRequest) -> Result<TimeSeries> {
        let file = File::open(path)
            .map_err(|e| source_error(self.name(), format!("{}: {}", path.display(), e)))?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));

        let headers = reader
            .headers()
            .map_err(|e| source_error(self.name(), e.to_string()))?
            .clone();
        let column = |wanted: &str, fallback: usize| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
                .unwrap_or(fallback)
        };
        let date_idx = column("date", 0);
        let value_idx = column("value", 1);

        let mut points = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let record = result.map_err(|e| source_error(self.name(), e.to_string()))?;
            let raw_date = record.get(date_idx).unwrap_or("").trim();
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
                source_error(
                    self.name(),
                    format!("{} row {}: bad date '{}': {}", path.display(), line + 1, raw_date, e),
                )
            })?;
            if !request.contains(date) {
                continue;
            }
            let raw_value = record.get(value_idx).unwrap_or("").trim();
            let value = match raw_value {
                "" | "." => f64::NAN,
                text => text.parse::<f64>().map_err(|e| {
                    source_error(
                        self.name(),
                        format!(
                            "{} row {}: bad value '{}': {}",
                            path.display(),
                            line + 1,
                            text,
                            e
                        ),
                    )
                })?,
            };
            points.push((date, value));
        }

        TimeSeries::new(request.name.clone(), request.cadence, points)
    }
}

impl DataSource for CsvFileSource {
    fn name(&self) -> &str {
        "csv-file"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn is_available(&self, request: &SeriesRequest) -> bool {
        self.path_for(&request.name).is_file()
    }

    fn fetch(&self, request: &SeriesRequest) -> Result<SourcedSeries> {
        let path = self.path_for(&request.name);
        let series = self.read(&path, request)?;
        debug!(series = %request.name, rows = series.len(), path = %path.display(), "Loaded file series");
        Ok(SourcedSeries {
            series,
            kind: SourceKind::File,
            origin: path.display().to_string(),
            reporting_lag_hint: None,
        })
    }
}

/// Adapts a remote statistics client to the data source contract.
#[derive(Debug, Clone)]
pub struct ApiSource<C: SeriesClient> {
    client: C,
    lag_hints: BTreeMap<String, usize>,
}

impl<C: SeriesClient> ApiSource<C> {
    /// Source backed by `client`.
    pub fn new(client: C) -> Self {
        Self {
            client,
            lag_hints: BTreeMap::new(),
        }
    }

    /// Publish a reporting-lag hint for a series.
    pub fn with_lag_hint(mut self, name: impl Into<String>, lag: usize) -> Self {
        self.lag_hints.insert(name.into(), lag);
        self
    }
}

impl<C: SeriesClient> DataSource for ApiSource<C> {
    fn name(&self) -> &str {
        "api"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Api
    }

    fn is_available(&self, request: &SeriesRequest) -> bool {
        self.client.series_id(&request.name).is_some()
    }

    fn fetch(&self, request: &SeriesRequest) -> Result<SourcedSeries> {
        let series_id = self.client.series_id(&request.name).ok_or_else(|| {
            source_error(self.name(), format!("no provider series for '{}'", request.name))
        })?;
        let series = self.client.download(&series_id, request)?;
        let series = if series.name() == request.name {
            series
        } else {
            series.renamed(request.name.clone())
        };
        Ok(SourcedSeries {
            series,
            kind: SourceKind::Api,
            origin: series_id,
            reporting_lag_hint: self.lag_hints.get(&request.name).copied(),
        })
    }
}

/// Serves each request from the first available source in priority order.
///
/// A source that is available but fails is logged and the next one is tried.
pub struct PrioritizedSource {
    sources: Vec<Box<dyn DataSource>>,
}

impl PrioritizedSource {
    /// Empty source list.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Append a lower-priority source.
    pub fn then(mut self, source: impl DataSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Manual files first, API fallback.
    pub fn file_then_api<C: SeriesClient + 'static>(dir: impl Into<PathBuf>, client: C) -> Self {
        Self::new()
            .then(CsvFileSource::new(dir))
            .then(ApiSource::new(client))
    }
}

impl Default for PrioritizedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for PrioritizedSource {
    fn name(&self) -> &str {
        "prioritized"
    }

    /// Kind of the highest-priority source.
    fn kind(&self) -> SourceKind {
        self.sources
            .first()
            .map_or(SourceKind::File, |s| s.kind())
    }

    fn is_available(&self, request: &SeriesRequest) -> bool {
        self.sources.iter().any(|s| s.is_available(request))
    }

    fn fetch(&self, request: &SeriesRequest) -> Result<SourcedSeries> {
        let mut last_error = None;
        for source in self.sources.iter().filter(|s| s.is_available(request)) {
            match source.fetch(request) {
                Ok(sourced) => {
                    info!(
                        series = %request.name,
                        source = source.name(),
                        kind = %sourced.kind,
                        "Series sourced"
                    );
                    return Ok(sourced);
                }
                Err(e) => {
                    warn!(series = %request.name, source = source.name(), error = %e, "Source failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            source_error(self.name(), format!("no source can serve '{}'", request.name))
        }))
    }
}
