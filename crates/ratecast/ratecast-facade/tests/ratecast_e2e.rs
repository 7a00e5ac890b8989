//! End-to-end tests for the ratecast stack
//!
//! Runs the full pipeline on synthetic monthly data through the facade API.

use chrono::NaiveDate;
use ratecast_facade::prelude::*;
use ratecast_facade::CausalityDecision;

fn noise(i: usize, seed: u64) -> f64 {
    let mut x = (i as u64).wrapping_add(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;
    (x >> 11) as f64 / (1u64 << 53) as f64 - 0.5
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 31).unwrap()
}

fn monthly(name: &str, values: Vec<f64>) -> TimeSeries {
    TimeSeries::from_values(name, start(), values).unwrap()
}

/// Target driven by last month's regressor: `y_t = 0.5 y_{t-1} + beta x_{t-1} + e_t`.
fn driven(n: usize, beta: f64, x_seed: u64, e_seed: u64) -> (TimeSeries, TimeSeries) {
    let x: Vec<f64> = (0..n).map(|i| 2.0 * noise(i, x_seed)).collect();
    let mut y = vec![0.0; n];
    for t in 1..n {
        y[t] = 0.5 * y[t - 1] + beta * x[t - 1] + 0.1 * noise(t, e_seed);
    }
    (monthly("RATE", y), monthly("X", x))
}

#[test]
fn e2e_trending_rate_with_irrelevant_regressor() {
    let n = 48;
    let target = monthly("RATE", (0..n).map(|i| 0.05 * i as f64 + noise(i, 21)).collect());
    let junk = monthly("JUNK", (0..n).map(|i| noise(i, 22)).collect());

    let pipeline = RatePipeline::with_defaults();
    let outcome = pipeline
        .run(&target, &[Regressor::new(RegressorSpec::new("JUNK", 1), junk)])
        .unwrap();

    assert_eq!(outcome.features.rows, 47);
    assert_eq!(outcome.stationarity.d, 1);
    assert!(outcome.retained.is_empty());
    assert_eq!(outcome.causality[0].decision, CausalityDecision::Insignificant);

    assert_eq!(outcome.winner(), ModelKind::Baseline);
    assert_eq!(outcome.evaluation.ranking, vec![ModelKind::Baseline]);
    assert_eq!(outcome.evaluation.holdout.test_len, 10);
    assert!(outcome.evaluation.has_flag("challenger_not_attempted"));
    assert!(outcome
        .diagnostics()
        .iter()
        .any(|f| f.code() == "regressor_dropped"));
    assert_eq!(outcome.models.baseline.order.d, 1);
}

#[test]
fn e2e_informative_regressor_beats_baseline() {
    let (target, x) = driven(80, 1.0, 11, 12);

    let pipeline = RatePipeline::with_defaults();
    let outcome = pipeline
        .run(&target, &[Regressor::new(RegressorSpec::new("X", 1), x)])
        .unwrap();

    assert_eq!(outcome.stationarity.d, 0);
    assert_eq!(outcome.retained, vec!["X_lag1".to_string()]);
    assert_eq!(outcome.winner(), ModelKind::Challenger);
    assert_eq!(
        outcome.evaluation.ranking,
        vec![ModelKind::Challenger, ModelKind::Baseline]
    );

    let challenger = outcome.models.challenger.model().unwrap();
    let beta = challenger.exog_coefficient("X_lag1").unwrap();
    assert!((beta.value - 1.0).abs() < 0.1, "beta = {}", beta.value);
    assert!(beta.significant);

    let baseline_rmse = outcome.evaluation.score(ModelKind::Baseline).unwrap().rmse;
    let challenger_rmse = outcome.evaluation.score(ModelKind::Challenger).unwrap().rmse;
    assert!(challenger_rmse < 0.1);
    assert!(baseline_rmse > 0.3);
    assert!(outcome.evaluation.improvement.unwrap() > 0.0);
}

#[test]
fn e2e_short_history_is_rejected() {
    let target = monthly("RATE", (0..10).map(|i| noise(i, 5)).collect());

    let err = RatePipeline::with_defaults().run(&target, &[]).unwrap_err();
    assert_eq!(
        err,
        RatecastError::InsufficientData {
            series: "RATE".to_string(),
            required: 36,
            actual: 10,
        }
    );
    assert!(err.is_fatal_condition());
}

#[test]
fn e2e_sign_inversion_is_flagged_not_fatal() {
    let (target, x) = driven(80, -1.0, 31, 32);
    let config = RunConfig::default().expect_sign("X", ExpectedSign::Positive);

    let outcome = RatePipeline::new(config)
        .unwrap()
        .run(&target, &[Regressor::new(RegressorSpec::new("X", 1), x)])
        .unwrap();

    let inversions = outcome.evaluation.sign_inversions();
    assert_eq!(inversions.len(), 1);
    match inversions[0] {
        DiagnosticFlag::SignInversion {
            feature,
            expected,
            fitted,
        } => {
            assert_eq!(feature, "X_lag1");
            assert_eq!(*expected, ExpectedSign::Positive);
            assert!(*fitted < -0.9);
        }
        other => panic!("unexpected flag {:?}", other),
    }
    // The inversion does not disqualify the challenger.
    assert_eq!(outcome.winner(), ModelKind::Challenger);
}

#[test]
fn e2e_static_mode_keeps_ranking() {
    let (target, x) = driven(80, 1.0, 11, 12);
    let config = RunConfig::default().evaluation_mode(EvaluationMode::Static);

    let outcome = RatePipeline::new(config)
        .unwrap()
        .run(&target, &[Regressor::new(RegressorSpec::new("X", 1), x)])
        .unwrap();

    assert_eq!(outcome.winner(), ModelKind::Challenger);
    let forecasts = &outcome.evaluation.score(ModelKind::Challenger).unwrap().forecasts;
    assert_eq!(forecasts.len(), outcome.evaluation.holdout.test_len);
}

#[test]
fn e2e_outcome_serializes_to_json() {
    let (target, x) = driven(80, 1.0, 11, 12);
    let outcome = RatePipeline::with_defaults()
        .run(&target, &[Regressor::new(RegressorSpec::new("X", 1), x)])
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["target"], "RATE");
    assert_eq!(json["evaluation"]["winner"], "challenger");
    assert_eq!(json["models"]["challenger"]["status"], "fitted");
}
