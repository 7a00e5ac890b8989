//! ARIMA with exogenous regressors, estimated by the Hannan-Rissanen
//! two-stage regression.
//!
//! ## Model
//!
//! On the `d`-times differenced target `w` and differenced exogenous columns `z`:
//!
//! ```text
//! w_t = c + b'z_t + phi_1 w_{t-1} + ... + phi_p w_{t-p}
//!           + e_t + theta_1 e_{t-1} + ... + theta_q e_{t-q}
//! ```
//!
//! Stage one fits a long autoregression to estimate the innovations; stage two
//! regresses `w_t` on the constant, `z_t`, the lagged `w` and the lagged
//! innovation estimates. Residuals are then recomputed recursively with the
//! stage-two coefficients, conditioning on zero pre-sample innovations.

use nalgebra::DMatrix;
use ratecast_api::{difference, ArimaOrder, FitStatistics, RatecastError, Result};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::regression::{design_matrix, ols};

/// Estimate of one exogenous coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExogEstimate {
    pub value: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
}

/// A fitted ARIMAX model with frozen parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaxFit {
    /// Fitted order
    pub order: ArimaOrder,
    /// Constant on the differenced scale
    pub intercept: f64,
    /// AR coefficients, lag 1 first
    pub ar: Vec<f64>,
    /// MA coefficients, lag 1 first
    pub ma: Vec<f64>,
    /// Exogenous coefficients, in column order
    pub exog: Vec<ExogEstimate>,
    /// Recursive residuals on the differenced scale
    pub residuals: Vec<f64>,
    /// First differenced index entering the likelihood
    pub sample_start: usize,
    /// Fit statistics over `sample_start..`
    pub stats: FitStatistics,
}

/// Difference the target and every exogenous column `d` times.
fn differenced(target: &[f64], exog: &[&[f64]], d: usize) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
    if let Some(col) = exog.iter().position(|c| c.len() != target.len()) {
        return Err(RatecastError::Numerical(format!(
            "exogenous column {} has {} rows, target has {}",
            col,
            exog[col].len(),
            target.len()
        )));
    }
    let w = difference(target, d);
    let z = exog.iter().map(|c| difference(c, d)).collect();
    Ok((w, z))
}

/// Whether every root of the lag polynomial with companion first row
/// `coefficients` lies strictly inside the unit circle.
fn roots_inside_unit_circle(coefficients: &[f64]) -> bool {
    let k = coefficients.len();
    if k == 0 {
        return true;
    }
    if coefficients.iter().any(|c| !c.is_finite()) {
        return false;
    }
    let companion = DMatrix::from_fn(k, k, |i, j| {
        if i == 0 {
            coefficients[j]
        } else if i == j + 1 {
            1.0
        } else {
            0.0
        }
    });
    companion
        .complex_eigenvalues()
        .iter()
        .all(|root| root.norm_sqr() < 1.0)
}

/// Binomial coefficients `C(d, k)` for `k = 0..=d`.
fn binomial_row(d: usize) -> Vec<f64> {
    let mut row = vec![1.0];
    for k in 1..=d {
        let previous = row[k - 1];
        row.push(previous * (d + 1 - k) as f64 / k as f64);
    }
    row
}

/// Level value implied by a differenced value and the `d` preceding levels.
///
/// `levels(k)` returns the level `k` steps back.
fn integrate(w: f64, d: usize, levels: impl Fn(usize) -> f64) -> f64 {
    let binomial = binomial_row(d);
    (1..=d).fold(w, |acc, k| {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        acc + sign * binomial[k] * levels(k)
    })
}

/// Order of the long autoregression used for the innovation estimates.
fn long_ar_order(order: ArimaOrder, n: usize) -> usize {
    let log_n = (n.max(2) as f64).ln().ceil() as usize;
    (order.p + order.q).max(log_n).min(n / 4)
}

/// Fit an ARIMAX model of the given order.
///
/// `target` is in levels and every `exog` column shares its rows. The
/// likelihood is evaluated from differenced index `sample_start` (raised to at
/// least `max(p, q)`), so criteria from fits sharing a start are comparable.
pub fn fit(
    target: &[f64],
    exog: &[&[f64]],
    order: ArimaOrder,
    sample_start: usize,
) -> Result<ArimaxFit> {
    let ArimaOrder { p, d, q } = order;
    let (w, z) = differenced(target, exog, d)?;
    let n = w.len();
    let n_exog = z.len();

    // Stage one: innovation estimates from a long autoregression
    let innovations = if q > 0 {
        let m = long_ar_order(order, n);
        if m == 0 {
            return Err(RatecastError::Numerical(format!(
                "{} differenced observations are too few for {}",
                n, order
            )));
        }
        let rows: Vec<Vec<f64>> = (m..n)
            .map(|t| {
                let mut row = Vec::with_capacity(1 + n_exog + m);
                row.push(1.0);
                row.extend(z.iter().map(|col| col[t]));
                row.extend((1..=m).map(|i| w[t - i]));
                row
            })
            .collect();
        let long_ar = ols(&design_matrix(&rows), &w[m..])?;
        let mut e = vec![0.0; n];
        e[m..].copy_from_slice(&long_ar.residuals);
        Some((m, e))
    } else {
        None
    };

    // Stage two: regression on lagged values and lagged innovations
    let start = match &innovations {
        Some((m, _)) => p.max(m + q),
        None => p,
    };
    let n_coef = 1 + n_exog + p + q;
    if n <= start + n_coef {
        return Err(RatecastError::Numerical(format!(
            "{} differenced observations are too few for {} with {} regressor(s)",
            n, order, n_exog
        )));
    }
    let rows: Vec<Vec<f64>> = (start..n)
        .map(|t| {
            let mut row = Vec::with_capacity(n_coef);
            row.push(1.0);
            row.extend(z.iter().map(|col| col[t]));
            row.extend((1..=p).map(|i| w[t - i]));
            if let Some((_, e)) = &innovations {
                row.extend((1..=q).map(|j| e[t - j]));
            }
            row
        })
        .collect();
    let stage_two = ols(&design_matrix(&rows), &w[start..])?;

    let intercept = stage_two.coefficients[0];
    let beta: Vec<f64> = stage_two.coefficients[1..1 + n_exog].to_vec();
    let ar: Vec<f64> = stage_two.coefficients[1 + n_exog..1 + n_exog + p].to_vec();
    let ma: Vec<f64> = stage_two.coefficients[1 + n_exog + p..].to_vec();

    if !roots_inside_unit_circle(&ar) {
        return Err(RatecastError::Numerical(format!(
            "{} AR polynomial is not stationary",
            order
        )));
    }
    let neg_ma: Vec<f64> = ma.iter().map(|t| -t).collect();
    if !roots_inside_unit_circle(&neg_ma) {
        return Err(RatecastError::Numerical(format!(
            "{} MA polynomial is not invertible",
            order
        )));
    }

    let df = stage_two.df_resid() as f64;
    let t_dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| RatecastError::Numerical(format!("t distribution: {}", e)))?;
    let exog_estimates: Vec<ExogEstimate> = (0..n_exog)
        .map(|j| {
            let value = stage_two.coefficients[1 + j];
            let std_error = stage_two.std_errors[1 + j];
            let t_statistic = value / std_error;
            let p_value = if t_statistic.is_finite() {
                2.0 * (1.0 - t_dist.cdf(t_statistic.abs()))
            } else {
                f64::NAN
            };
            ExogEstimate {
                value,
                std_error,
                t_statistic,
                p_value,
            }
        })
        .collect();

    let model = Recursion {
        intercept,
        beta: &beta,
        ar: &ar,
        ma: &ma,
    };
    let residuals = model.residuals(&w, &z);

    let sample_start = sample_start.max(p).max(q);
    if n <= sample_start {
        return Err(RatecastError::Numerical(format!(
            "likelihood sample starting at {} is empty",
            sample_start
        )));
    }
    let nobs = n - sample_start;
    let ssr: f64 = residuals[sample_start..].iter().map(|e| e * e).sum();
    let sigma2 = ssr / nobs as f64;
    let n_params = n_coef + 1;
    let log_likelihood =
        -0.5 * nobs as f64 * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
    let aic = -2.0 * log_likelihood + 2.0 * n_params as f64;
    let bic = -2.0 * log_likelihood + n_params as f64 * (nobs as f64).ln();
    if !(sigma2 > 0.0) || !log_likelihood.is_finite() || !aic.is_finite() {
        return Err(RatecastError::Numerical(format!(
            "{} produced a degenerate residual variance",
            order
        )));
    }

    Ok(ArimaxFit {
        order,
        intercept,
        ar,
        ma,
        exog: exog_estimates,
        residuals,
        sample_start,
        stats: FitStatistics {
            log_likelihood,
            aic,
            bic,
            sigma2,
            nobs,
            n_params,
        },
    })
}

/// Borrowed parameter view used for residual and forecast recursions.
struct Recursion<'a> {
    intercept: f64,
    beta: &'a [f64],
    ar: &'a [f64],
    ma: &'a [f64],
}

impl Recursion<'_> {
    /// Conditional mean of `w_t` given lagged values and innovations.
    fn predict(&self, t: usize, w: &[f64], z: &[Vec<f64>], e: &[f64]) -> f64 {
        let exog: f64 = self.beta.iter().zip(z).map(|(b, col)| b * col[t]).sum();
        let ar: f64 = self
            .ar
            .iter()
            .enumerate()
            .filter(|(i, _)| t > *i)
            .map(|(i, phi)| phi * w[t - i - 1])
            .sum();
        let ma: f64 = self
            .ma
            .iter()
            .enumerate()
            .filter(|(j, _)| t > *j)
            .map(|(j, theta)| theta * e[t - j - 1])
            .sum();
        self.intercept + exog + ar + ma
    }

    /// Recursive residuals, zero before index `p`.
    fn residuals(&self, w: &[f64], z: &[Vec<f64>]) -> Vec<f64> {
        let mut e = vec![0.0; w.len()];
        for t in self.ar.len()..w.len() {
            e[t] = w[t] - self.predict(t, w, z, &e);
        }
        e
    }
}

impl ArimaxFit {
    fn exog_values(&self) -> Vec<f64> {
        self.exog.iter().map(|x| x.value).collect()
    }

    fn check_origin(&self, target: &[f64], origin: usize) -> Result<()> {
        let d = self.order.d;
        if origin <= d + self.order.p || origin > target.len() {
            return Err(RatecastError::InvalidParameter {
                name: "origin".to_string(),
                reason: format!(
                    "forecast origin {} outside {}..={} for {}",
                    origin,
                    d + self.order.p + 1,
                    target.len(),
                    self.order
                ),
            });
        }
        Ok(())
    }

    /// One-step-ahead level forecasts for rows `origin..target.len()`, each
    /// using realized values before it and parameters frozen at fit time.
    pub fn forecast_walk_forward(
        &self,
        target: &[f64],
        exog: &[&[f64]],
        origin: usize,
    ) -> Result<Vec<f64>> {
        self.check_origin(target, origin)?;
        let d = self.order.d;
        let (w, z) = differenced(target, exog, d)?;
        let beta = self.exog_values();
        let model = Recursion {
            intercept: self.intercept,
            beta: &beta,
            ar: &self.ar,
            ma: &self.ma,
        };
        let e = model.residuals(&w, &z);

        Ok((origin..target.len())
            .map(|i| {
                let w_hat = model.predict(i - d, &w, &z, &e);
                integrate(w_hat, d, |k| target[i - k])
            })
            .collect())
    }

    /// Multi-step level forecasts for rows `origin..target.len()` from the
    /// origin, feeding back forecasts and using realized exogenous values.
    pub fn forecast_static(
        &self,
        target: &[f64],
        exog: &[&[f64]],
        origin: usize,
    ) -> Result<Vec<f64>> {
        self.check_origin(target, origin)?;
        let d = self.order.d;
        let (w, z) = differenced(target, exog, d)?;
        let beta = self.exog_values();
        let model = Recursion {
            intercept: self.intercept,
            beta: &beta,
            ar: &self.ar,
            ma: &self.ma,
        };

        let split = origin - d;
        let history = &w[..split];
        let mut e = model.residuals(history, &z);
        let mut w_path = history.to_vec();
        let mut levels = target[..origin].to_vec();
        for i in origin..target.len() {
            let t = i - d;
            let w_hat = model.predict(t, &w_path, &z, &e);
            w_path.push(w_hat);
            e.push(0.0);
            let level = integrate(w_hat, d, |k| levels[i - k]);
            levels.push(level);
        }
        Ok(levels[origin..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::noise;

    fn ar1(n: usize, phi: f64) -> Vec<f64> {
        let mut y = vec![0.0; n];
        for t in 1..n {
            y[t] = phi * y[t - 1] + noise(t, 1);
        }
        y
    }

    #[test]
    fn test_binomial_row() {
        assert_eq!(binomial_row(0), vec![1.0]);
        assert_eq!(binomial_row(2), vec![1.0, 2.0, 1.0]);
        assert_eq!(binomial_row(3), vec![1.0, 3.0, 3.0, 1.0]);
    }

    #[test]
    fn test_integrate_second_difference() {
        // levels 1, 4, 9 -> next level 16 has second difference 2
        let levels = [9.0, 4.0, 1.0];
        assert!((integrate(2.0, 2, |k| levels[k - 1]) - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_unit_circle_check() {
        assert!(roots_inside_unit_circle(&[0.5]));
        assert!(!roots_inside_unit_circle(&[1.2]));
        assert!(roots_inside_unit_circle(&[0.5, 0.3]));
        assert!(!roots_inside_unit_circle(&[0.6, 0.5]));
        assert!(roots_inside_unit_circle(&[]));
    }

    #[test]
    fn test_unit_circle_check_complex_roots() {
        // z^2 + 0.81 and z^2 + 1.21 have purely imaginary roots
        assert!(roots_inside_unit_circle(&[0.0, -0.81]));
        assert!(!roots_inside_unit_circle(&[0.0, -1.21]));
        assert!(roots_inside_unit_circle(&[1.0, -0.5]));
        assert!(!roots_inside_unit_circle(&[1.0, -1.1]));
    }

    #[test]
    fn test_ar1_recovery() {
        let y = ar1(240, 0.6);
        let fit = fit(&y, &[], ArimaOrder::new(1, 0, 0), 0).unwrap();
        assert!((fit.ar[0] - 0.6).abs() < 0.1);
        assert!(fit.ma.is_empty());
        assert_eq!(fit.stats.n_params, 3);
        assert!(fit.stats.aic.is_finite());
    }

    #[test]
    fn test_ma1_recovery() {
        let e: Vec<f64> = (0..300).map(|i| noise(i, 1)).collect();
        let y: Vec<f64> = (0..300)
            .map(|t| e[t] + if t > 0 { 0.5 * e[t - 1] } else { 0.0 })
            .collect();
        let fit = fit(&y, &[], ArimaOrder::new(0, 0, 1), 0).unwrap();
        assert!((fit.ma[0] - 0.5).abs() < 0.15);
    }

    #[test]
    fn test_exog_coefficient_sign_and_significance() {
        let x: Vec<f64> = (0..120).map(|i| noise(i, 3) * 4.0).collect();
        let y: Vec<f64> = (0..120)
            .map(|i| 2.0 - 1.5 * x[i] + 0.1 * noise(i, 4))
            .collect();
        let fit = fit(&y, &[&x], ArimaOrder::new(0, 0, 0), 0).unwrap();
        assert!((fit.exog[0].value + 1.5).abs() < 0.05);
        assert!(fit.exog[0].p_value < 1e-6);
        assert!(fit.exog[0].t_statistic < 0.0);
    }

    #[test]
    fn test_constant_exog_is_singular() {
        let y = ar1(100, 0.3);
        let flat = vec![2.0; 100];
        let err = fit(&y, &[&flat], ArimaOrder::new(1, 0, 0), 0).unwrap_err();
        assert!(matches!(err, RatecastError::Numerical(_)));
    }

    #[test]
    fn test_too_few_observations() {
        let y = ar1(8, 0.3);
        assert!(fit(&y, &[], ArimaOrder::new(3, 1, 3), 0).is_err());
    }

    #[test]
    fn test_common_sample_start() {
        let y = ar1(150, 0.4);
        let a = fit(&y, &[], ArimaOrder::new(0, 0, 0), 5).unwrap();
        let b = fit(&y, &[], ArimaOrder::new(2, 0, 0), 5).unwrap();
        assert_eq!(a.stats.nobs, b.stats.nobs);
        assert_eq!(a.sample_start, 5);
    }

    #[test]
    fn test_walk_forward_tracks_trend() {
        let y: Vec<f64> = (0..80).map(|i| 0.5 * i as f64 + 0.01 * noise(i, 5)).collect();
        let model = fit(&y[..64], &[], ArimaOrder::new(0, 1, 0), 0).unwrap();
        assert!((model.intercept - 0.5).abs() < 0.01);
        let forecasts = model.forecast_walk_forward(&y, &[], 64).unwrap();
        assert_eq!(forecasts.len(), 16);
        for (f, actual) in forecasts.iter().zip(&y[64..]) {
            assert!((f - actual).abs() < 0.05);
        }
    }

    #[test]
    fn test_static_forecast_extends_drift() {
        let y: Vec<f64> = (0..80).map(|i| 0.5 * i as f64 + 0.01 * noise(i, 5)).collect();
        let model = fit(&y[..64], &[], ArimaOrder::new(0, 1, 0), 0).unwrap();
        let forecasts = model.forecast_static(&y, &[], 64).unwrap();
        assert_eq!(forecasts.len(), 16);
        assert!((forecasts[15] - y[63] - 16.0 * model.intercept).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_origin_validated() {
        let y = ar1(60, 0.5);
        let model = fit(&y[..50], &[], ArimaOrder::new(1, 0, 0), 0).unwrap();
        assert!(model.forecast_walk_forward(&y, &[], 0).is_err());
        assert!(model.forecast_walk_forward(&y, &[], 61).is_err());
    }
}
