//! Data source trait definition.

use crate::error::Result;
use crate::model::{SeriesRequest, SourceKind, SourcedSeries};

/// Anything that can produce a named, dated series.
///
/// Implementations must return a series whose name matches the request and
/// whose cadence is declared explicitly.
pub trait DataSource: Send + Sync {
    /// Source name used in logs and errors.
    fn name(&self) -> &str;

    /// Provenance reported for series from this source.
    fn kind(&self) -> SourceKind;

    /// Whether the source can currently serve `request`.
    fn is_available(&self, request: &SeriesRequest) -> bool;

    /// Fetch the requested series.
    fn fetch(&self, request: &SeriesRequest) -> Result<SourcedSeries>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeSeries;
    use chrono::NaiveDate;

    /// Mock implementation: in-memory table of monthly values
    struct StaticSource {
        values: Vec<f64>,
    }

    impl DataSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        fn kind(&self) -> SourceKind {
            SourceKind::File
        }

        fn is_available(&self, request: &SeriesRequest) -> bool {
            request.name == "CPI"
        }

        fn fetch(&self, request: &SeriesRequest) -> Result<SourcedSeries> {
            let start = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
            Ok(SourcedSeries {
                series: TimeSeries::from_values(request.name.clone(), start, self.values.clone())?,
                kind: self.kind(),
                origin: "memory".to_string(),
                reporting_lag_hint: Some(1),
            })
        }
    }

    #[test]
    fn test_source_as_trait_object() {
        let source: Box<dyn DataSource> = Box::new(StaticSource {
            values: vec![1.0, 2.0, 3.0],
        });
        let request = SeriesRequest::monthly("CPI");
        assert!(source.is_available(&request));
        assert!(!source.is_available(&SeriesRequest::monthly("GDP")));

        let sourced = source.fetch(&request).unwrap();
        assert_eq!(sourced.series.name(), "CPI");
        assert_eq!(sourced.series.len(), 3);
        assert_eq!(sourced.kind, SourceKind::File);
    }
}
