//! Integration tests for ratecast-facade
//!
//! Exercises sources, configuration, feature alignment and batch runs
//! together through the public API.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use ratecast_facade::prelude::*;
use ratecast_facade::{ArimaOrder, FeatureBuilder, FixedOrder, SourceKind};

fn noise(i: usize, seed: u64) -> f64 {
    let mut x = (i as u64).wrapping_add(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;
    (x >> 11) as f64 / (1u64 << 53) as f64 - 0.5
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn driven(n: usize) -> (TimeSeries, TimeSeries) {
    let x: Vec<f64> = (0..n).map(|i| 2.0 * noise(i, 11)).collect();
    let mut y = vec![0.0; n];
    for t in 1..n {
        y[t] = 0.5 * y[t - 1] + x[t - 1] + 0.1 * noise(t, 12);
    }
    (
        TimeSeries::from_values("RATE", date(2015, 1, 31), y).unwrap(),
        TimeSeries::from_values("X", date(2015, 1, 31), x).unwrap(),
    )
}

fn write_series(dir: &Path, series: &TimeSeries) {
    let mut body = String::from("date,value\n");
    for (d, v) in series.points() {
        body.push_str(&format!("{},{}\n", d.format("%Y-%m-%d"), v));
    }
    fs::write(dir.join(format!("{}.csv", series.name())), body).unwrap();
}

#[test]
fn test_run_from_csv_files() {
    let (target, x) = driven(80);
    let dir = tempfile::tempdir().unwrap();
    write_series(dir.path(), &target);
    write_series(dir.path(), &x);

    let source = PrioritizedSource::new().then(CsvFileSource::new(dir.path()));
    let rate = source.fetch(&SeriesRequest::monthly("RATE")).unwrap();
    let regressor = source.fetch(&SeriesRequest::monthly("X")).unwrap();
    assert_eq!(rate.kind, SourceKind::File);
    assert_eq!(rate.series, target);

    let outcome = RatePipeline::with_defaults()
        .run(
            &rate.series,
            &[Regressor::new(RegressorSpec::new("X", 1), regressor.series)],
        )
        .unwrap();
    let in_memory = RatePipeline::with_defaults()
        .run(&target, &[Regressor::new(RegressorSpec::new("X", 1), x)])
        .unwrap();
    assert_eq!(outcome, in_memory);
    assert_eq!(outcome.winner(), ModelKind::Challenger);
}

#[test]
fn test_partial_config_json() {
    let config: RunConfig = serde_json::from_str(
        r#"{"significance_threshold": 0.01, "evaluation_mode": "static",
            "expected_signs": {"CPI": "positive"}}"#,
    )
    .unwrap();
    assert_eq!(config.significance_threshold, 0.01);
    assert_eq!(config.evaluation_mode, EvaluationMode::Static);
    assert_eq!(config.expected_sign("CPI_lag1", "CPI"), ExpectedSign::Positive);
    assert_eq!(config.max_diff_order, 2);
    assert!(RatePipeline::new(config).is_ok());
}

#[test]
fn test_features_only_use_published_values() {
    let n = 60;
    let target = TimeSeries::from_values(
        "RATE",
        date(2016, 1, 31),
        (0..n).map(|i| i as f64).collect(),
    )
    .unwrap();
    let cpi = TimeSeries::from_values(
        "CPI",
        date(2016, 1, 31),
        (0..n).map(|i| 100.0 + i as f64).collect(),
    )
    .unwrap();

    let spec = RegressorSpec::new("CPI", 2).with_extra_lag(3);
    let set = FeatureBuilder::new(36)
        .build(&target, &[Regressor::new(spec, cpi.clone())])
        .unwrap();

    assert_eq!(set.len(), n - 3);
    for lag in [2usize, 3] {
        let feature = set.feature(&format!("CPI_lag{}", lag)).unwrap();
        for (row, month) in set.dates().iter().enumerate() {
            let published = ratecast_facade::shift_months(*month, -(lag as i32)).unwrap();
            assert_eq!(Some(feature.values[row]), cpi.value_at(published));
        }
    }
}

#[test]
fn test_runs_are_deterministic() {
    let (target, x) = driven(80);
    let regressors = [Regressor::new(RegressorSpec::new("X", 1), x)];
    let pipeline = RatePipeline::with_defaults();

    let first = pipeline.run(&target, &regressors).unwrap();
    let second = pipeline.run(&target, &regressors).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_batch_keeps_job_order() {
    let (target, x) = driven(80);
    let short = TimeSeries::from_values("SHORT", date(2020, 1, 31), vec![1.0; 10]).unwrap();
    let jobs = vec![
        ForecastJob::new(target, vec![Regressor::new(RegressorSpec::new("X", 1), x)]),
        ForecastJob::new(short, Vec::new()),
    ];

    let results = RatePipeline::with_defaults().run_batch(&jobs);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().target, "RATE");
    assert!(matches!(
        results[1],
        Err(RatecastError::InsufficientData { actual: 10, .. })
    ));
}

#[test]
fn test_wide_tie_tolerance_favors_baseline() {
    let (target, x) = driven(80);
    let config = RunConfig::default().tie_tolerance(10.0);

    let outcome = RatePipeline::new(config)
        .unwrap()
        .run(&target, &[Regressor::new(RegressorSpec::new("X", 1), x)])
        .unwrap();
    assert_eq!(outcome.winner(), ModelKind::Baseline);
    assert_eq!(
        outcome.evaluation.ranking,
        vec![ModelKind::Baseline, ModelKind::Challenger]
    );
    assert!(outcome.evaluation.improvement.unwrap() > 0.0);
}

#[test]
fn test_fixed_order_strategy() {
    let (target, x) = driven(80);
    let pipeline = RatePipeline::with_defaults().with_strategy(Arc::new(FixedOrder::new(1, 0)));

    let outcome = pipeline
        .run(&target, &[Regressor::new(RegressorSpec::new("X", 1), x)])
        .unwrap();
    assert_eq!(outcome.models.baseline.order, ArimaOrder::new(1, 0, 0));
    let challenger = outcome.models.challenger.model().unwrap();
    assert_eq!(challenger.order, ArimaOrder::new(1, 0, 0));
    assert!((challenger.exog[0].value - 1.0).abs() < 0.1);
    assert_eq!(challenger.orders_evaluated, 1);
}
