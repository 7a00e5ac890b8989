//! Ordinary least squares shared by the unit-root, causality and ARIMAX
//! estimators.

use nalgebra::{DMatrix, DVector};
use ratecast_api::{RatecastError, Result};

/// Smallest eigenvalue of the column-normalized cross-product matrix accepted
/// as non-singular.
const MIN_EIGENVALUE: f64 = 1e-10;

/// Result of an OLS regression.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, in design column order
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients
    pub std_errors: Vec<f64>,
    /// In-sample residuals
    pub residuals: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    /// Number of observations
    pub nobs: usize,
}

impl OlsFit {
    /// Number of estimated coefficients
    pub fn n_params(&self) -> usize {
        self.coefficients.len()
    }

    /// Residual degrees of freedom
    pub fn df_resid(&self) -> usize {
        self.nobs - self.n_params()
    }

    /// t-statistic of coefficient `i`
    pub fn t_statistic(&self, i: usize) -> f64 {
        self.coefficients[i] / self.std_errors[i]
    }

    /// Gaussian log-likelihood at the ML variance `ssr / nobs`
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI * self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion with one term per coefficient
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.n_params() as f64
    }
}

/// Build a design matrix from rows of regressors.
pub fn design_matrix(rows: &[Vec<f64>]) -> DMatrix<f64> {
    let ncols = rows.first().map_or(0, |r| r.len());
    DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j])
}

/// Fit `y = X b + e` by least squares.
///
/// Columns are normalized before the singularity check so that badly scaled
/// but independent regressors are not rejected.
pub fn ols(x: &DMatrix<f64>, y: &[f64]) -> Result<OlsFit> {
    let (nobs, k) = x.shape();
    if nobs != y.len() {
        return Err(RatecastError::Numerical(format!(
            "design has {} rows but response has {}",
            nobs,
            y.len()
        )));
    }
    if k == 0 || nobs <= k {
        return Err(RatecastError::Numerical(format!(
            "{} observations are too few for {} regressors",
            nobs, k
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(RatecastError::Numerical(
            "non-finite value in regression data".to_string(),
        ));
    }

    let scales: Vec<f64> = x.column_iter().map(|c| c.norm()).collect();
    if let Some(j) = scales.iter().position(|s| *s == 0.0) {
        return Err(RatecastError::Numerical(format!(
            "regressor column {} is identically zero",
            j
        )));
    }
    let scaled = DMatrix::from_fn(nobs, k, |i, j| x[(i, j)] / scales[j]);

    let xtx = scaled.transpose() * &scaled;
    let min_eigen = xtx
        .clone()
        .symmetric_eigenvalues()
        .iter()
        .cloned()
        .fold(f64::INFINITY, f64::min);
    if !(min_eigen > MIN_EIGENVALUE) {
        return Err(RatecastError::Numerical(format!(
            "singular design matrix (min eigenvalue {:.3e})",
            min_eigen
        )));
    }
    let xtx_inv = xtx.try_inverse().ok_or_else(|| {
        RatecastError::Numerical("design cross-product is not invertible".to_string())
    })?;

    let y_vec = DVector::from_column_slice(y);
    let beta_scaled = &xtx_inv * (scaled.transpose() * &y_vec);
    let residual_vec = &y_vec - &scaled * &beta_scaled;
    let ssr = residual_vec.norm_squared();
    let sigma2 = ssr / (nobs - k) as f64;

    let coefficients: Vec<f64> = (0..k).map(|j| beta_scaled[j] / scales[j]).collect();
    let std_errors: Vec<f64> = (0..k)
        .map(|j| (sigma2 * xtx_inv[(j, j)]).max(0.0).sqrt() / scales[j])
        .collect();

    if coefficients.iter().any(|c| !c.is_finite()) || !ssr.is_finite() {
        return Err(RatecastError::Numerical(
            "non-finite regression estimate".to_string(),
        ));
    }

    Ok(OlsFit {
        coefficients,
        std_errors,
        residuals: residual_vec.iter().cloned().collect(),
        ssr,
        nobs,
    })
}
