//! Granger-style causality screening of candidate features.

use ratecast_api::{
    difference, CausalityDecision, CausalityResult, Feature, FeatureSet, RunConfig, TimeSeries,
};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use tracing::{debug, info, warn};

use crate::regression::{design_matrix, ols};

/// Results of screening every candidate feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Screening {
    /// One result per candidate, ordered by feature name
    pub results: Vec<CausalityResult>,
    /// Names of the retained features
    pub retained: Vec<String>,
}

impl Screening {
    /// Results of the dropped features.
    pub fn dropped(&self) -> impl Iterator<Item = &CausalityResult> {
        self.results.iter().filter(|r| !r.is_retained())
    }
}

/// F-test filter deciding which features may enter the challenger model.
#[derive(Debug, Clone)]
pub struct CausalityScreener {
    lag: usize,
    threshold: f64,
}

impl Default for CausalityScreener {
    fn default() -> Self {
        Self::from_config(&RunConfig::default())
    }
}

impl CausalityScreener {
    /// Screener with a lag count and p-value threshold.
    pub fn new(lag: usize, threshold: f64) -> Self {
        Self {
            lag: lag.max(1),
            threshold,
        }
    }

    /// Screener configured from a run configuration.
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.causality_lag, config.significance_threshold)
    }

    /// Lag count of the test
    pub fn lag(&self) -> usize {
        self.lag
    }

    /// Test one feature against the target after differencing both `d` times.
    pub fn test(&self, target: &TimeSeries, feature: &Feature, d: usize) -> CausalityResult {
        let untestable = |reason: String| CausalityResult {
            feature: feature.name.clone(),
            target: target.name().to_string(),
            lag: self.lag,
            f_statistic: f64::NAN,
            p_value: f64::NAN,
            decision: CausalityDecision::Untestable,
            reason: Some(reason),
        };

        let y = difference(target.values(), d);
        let x = difference(&feature.values, d);
        if x.len() != y.len() {
            return untestable(format!(
                "feature has {} rows but target has {}",
                x.len(),
                y.len()
            ));
        }
        if y.iter().chain(x.iter()).any(|v| !v.is_finite()) {
            return untestable("missing values in overlap".to_string());
        }

        let lag = self.lag;
        let nobs = y.len().saturating_sub(lag);
        let unrestricted_params = 1 + 2 * lag;
        if nobs <= unrestricted_params {
            return untestable(format!(
                "{} overlapping observations are too few for lag {}",
                y.len(),
                lag
            ));
        }
        if x.iter().all(|v| *v == x[0]) {
            return untestable("feature is constant over the test window".to_string());
        }

        let mut restricted = Vec::with_capacity(nobs);
        let mut unrestricted = Vec::with_capacity(nobs);
        let mut response = Vec::with_capacity(nobs);
        for t in lag..y.len() {
            let mut row = Vec::with_capacity(unrestricted_params);
            row.push(1.0);
            row.extend((1..=lag).map(|i| y[t - i]));
            restricted.push(row.clone());
            // The column is already shifted by its reporting lag, so offset 0
            // only carries information dated at or before t - lag.
            row.extend((0..lag).map(|i| x[t - i]));
            unrestricted.push(row);
            response.push(y[t]);
        }

        let fits = ols(&design_matrix(&restricted), &response)
            .and_then(|r| ols(&design_matrix(&unrestricted), &response).map(|u| (r, u)));
        let (restricted_fit, unrestricted_fit) = match fits {
            Ok(fits) => fits,
            Err(e) => return untestable(e.to_string()),
        };

        let df_resid = unrestricted_fit.df_resid() as f64;
        let f_statistic = ((restricted_fit.ssr - unrestricted_fit.ssr).max(0.0) / lag as f64)
            / (unrestricted_fit.ssr / df_resid);
        if !f_statistic.is_finite() {
            return untestable("unrestricted regression fits exactly".to_string());
        }
        let p_value = match FisherSnedecor::new(lag as f64, df_resid) {
            Ok(dist) => 1.0 - dist.cdf(f_statistic),
            Err(e) => return untestable(e.to_string()),
        };

        let decision = if p_value < self.threshold {
            CausalityDecision::Retained
        } else {
            CausalityDecision::Insignificant
        };
        debug!(
            feature = %feature.name,
            f_statistic,
            p_value,
            %decision,
            "Causality test"
        );

        CausalityResult {
            feature: feature.name.clone(),
            target: target.name().to_string(),
            lag,
            f_statistic,
            p_value,
            decision,
            reason: None,
        }
    }

    /// Screen every feature of the set.
    pub fn screen(&self, features: &FeatureSet, d: usize) -> Screening {
        let results: Vec<CausalityResult> = features
            .features()
            .map(|f| self.test(features.target(), f, d))
            .collect();
        let retained: Vec<String> = results
            .iter()
            .filter(|r| r.is_retained())
            .map(|r| r.feature.clone())
            .collect();

        for dropped in results.iter().filter(|r| !r.is_retained()) {
            warn!(
                feature = %dropped.feature,
                decision = %dropped.decision,
                p_value = dropped.p_value,
                "Regressor dropped by causality screening"
            );
        }
        info!(
            candidates = results.len(),
            retained = retained.len(),
            lag = self.lag,
            "Causality screening complete"
        );

        Screening { results, retained }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::noise;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 1, 31).unwrap()
    }

    fn feature(name: &str, values: Vec<f64>) -> Feature {
        Feature {
            name: name.to_string(),
            source: name.trim_end_matches("_lag1").to_string(),
            lag: 1,
            values,
        }
    }

    fn driven_set() -> FeatureSet {
        // y[t] = 0.5 y[t-1] + x[t-1] + noise, feature column holds x[t-1]
        let n = 80;
        let x: Vec<f64> = (0..n).map(|i| noise(i, 1) * 2.0).collect();
        let mut y = vec![0.0; n];
        for t in 1..n {
            y[t] = 0.5 * y[t - 1] + x[t - 1] + 0.1 * noise(t, 2);
        }
        let mut lagged = vec![0.0; n];
        lagged[1..].copy_from_slice(&x[..n - 1]);
        let target = TimeSeries::from_values("RATE", start(), y[1..].to_vec()).unwrap();
        let junk: Vec<f64> = (1..n).map(|i| noise(i, 7)).collect();
        FeatureSet::new(
            target,
            vec![
                feature("X_lag1", lagged[1..].to_vec()),
                feature("JUNK_lag1", junk),
            ],
            n - 1,
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_driving_feature_retained() {
        let set = driven_set();
        let screening = CausalityScreener::default().screen(&set, 0);
        assert_eq!(screening.retained, vec!["X_lag1".to_string()]);
        let x = screening.results.iter().find(|r| r.feature == "X_lag1").unwrap();
        assert!(x.p_value < 1e-6);
        assert_eq!(x.decision, CausalityDecision::Retained);
    }

    #[test]
    fn test_noise_feature_dropped() {
        let set = driven_set();
        let screening = CausalityScreener::default().screen(&set, 0);
        let junk = screening.results.iter().find(|r| r.feature == "JUNK_lag1").unwrap();
        assert_eq!(junk.decision, CausalityDecision::Insignificant);
        assert!(junk.p_value >= 0.05);
        assert_eq!(screening.dropped().count(), 1);
    }

    #[test]
    fn test_results_ordered_by_name() {
        let screening = CausalityScreener::default().screen(&driven_set(), 0);
        let names: Vec<&str> = screening.results.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(names, vec!["JUNK_lag1", "X_lag1"]);
    }

    #[test]
    fn test_deterministic() {
        let set = driven_set();
        let screener = CausalityScreener::default();
        assert_eq!(screener.screen(&set, 1), screener.screen(&set, 1));
    }

    #[test]
    fn test_constant_feature_untestable() {
        let target =
            TimeSeries::from_values("RATE", start(), (0..30).map(|i| noise(i, 3)).collect())
                .unwrap();
        let result = CausalityScreener::default().test(&target, &feature("FLAT_lag1", vec![1.0; 30]), 0);
        assert_eq!(result.decision, CausalityDecision::Untestable);
        assert!(result.reason.is_some());
        assert!(result.p_value.is_nan());
    }

    #[test]
    fn test_short_overlap_untestable() {
        let target = TimeSeries::from_values("RATE", start(), vec![1.0, 2.0, 1.5, 2.5, 2.0]).unwrap();
        let result = CausalityScreener::default().test(
            &target,
            &feature("X_lag1", vec![0.3, 0.1, 0.4, 0.1, 0.5]),
            0,
        );
        assert_eq!(result.decision, CausalityDecision::Untestable);
    }
}
