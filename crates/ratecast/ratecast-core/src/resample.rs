//! Calendar-month resampling.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ratecast_api::{is_missing, month_end, Aggregation, Cadence, Result, TimeSeries};

/// Collapse a series of any cadence to month-end observations.
///
/// Missing values inside a month are ignored; a month whose observations are
/// all missing yields a missing value. Months without observations are absent.
pub fn to_monthly(series: &TimeSeries, aggregation: Aggregation) -> Result<TimeSeries> {
    let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for (date, value) in series.points() {
        let bucket = buckets.entry(month_end(date)).or_default();
        if !is_missing(value) {
            bucket.push(value);
        }
    }

    let points = buckets
        .into_iter()
        .map(|(month, values)| {
            let value = match aggregation {
                _ if values.is_empty() => f64::NAN,
                Aggregation::Last => values[values.len() - 1],
                Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            };
            (month, value)
        })
        .collect();

    TimeSeries::new(series.name(), Cadence::Monthly, points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily() -> TimeSeries {
        TimeSeries::new(
            "FX",
            Cadence::Daily,
            vec![
                (date(2020, 1, 2), 1.0),
                (date(2020, 1, 15), 2.0),
                (date(2020, 1, 30), 6.0),
                (date(2020, 2, 3), 4.0),
                (date(2020, 2, 28), f64::NAN),
                (date(2020, 4, 1), f64::NAN),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_last_value() {
        let monthly = to_monthly(&daily(), Aggregation::Last).unwrap();
        assert_eq!(monthly.cadence(), Cadence::Monthly);
        assert_eq!(monthly.dates(), &[date(2020, 1, 31), date(2020, 2, 29), date(2020, 4, 30)]);
        assert_eq!(monthly.values()[0], 6.0);
        assert_eq!(monthly.values()[1], 4.0);
        assert!(monthly.values()[2].is_nan());
    }

    #[test]
    fn test_mean_value() {
        let monthly = to_monthly(&daily(), Aggregation::Mean).unwrap();
        assert!((monthly.values()[0] - 3.0).abs() < 1e-12);
        assert_eq!(monthly.values()[1], 4.0);
    }

    #[test]
    fn test_monthly_input_unchanged() {
        let series = TimeSeries::from_values("CPI", date(2020, 1, 31), vec![1.0, 2.0, 3.0]).unwrap();
        let monthly = to_monthly(&series, Aggregation::Last).unwrap();
        assert_eq!(monthly, series);
    }
}
