//! Ordinary least squares via the normal equations
//!
//! The design matrix comes in as a faer matrix; X'X is factorized with a
//! Cholesky decomposition that doubles as the rank check: a pivot at or
//! below the relative tolerance means a singular or rank-deficient design
//! and aborts the fit.

use faer::Mat;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{Result, VelostatError};

/// Relative pivot tolerance below which X'X is treated as rank-deficient.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// One fitted term of the coefficient table.
#[derive(Debug, Clone)]
pub struct Coefficient {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
}

/// A fitted least-squares model.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: Vec<Coefficient>,
    pub residual_df: usize,
    beta: Vec<f64>,
}

impl OlsFit {
    /// Predict responses for a design matrix with the same term layout the
    /// model was fitted on.
    pub fn predict(&self, x: &Mat<f64>) -> Vec<f64> {
        (0..x.nrows())
            .map(|i| {
                self.beta
                    .iter()
                    .enumerate()
                    .map(|(j, b)| b * x[(i, j)])
                    .sum()
            })
            .collect()
    }
}

/// Fit ordinary least squares of `y` on `x`.
///
/// Returns the coefficient table (estimate, standard error, t-statistic,
/// two-sided p-value per term). Underdetermined systems, non-finite inputs,
/// and singular designs abort with a fit error.
pub fn fit_ols(x: &Mat<f64>, y: &[f64], terms: &[String]) -> Result<OlsFit> {
    let n = x.nrows();
    let p = x.ncols();

    if terms.len() != p {
        return Err(VelostatError::Fit(format!(
            "{} term names for {} design columns",
            terms.len(),
            p
        )));
    }
    if y.len() != n {
        return Err(VelostatError::Fit(format!(
            "{} responses for {} design rows",
            y.len(),
            n
        )));
    }
    if n <= p {
        return Err(VelostatError::Fit(format!(
            "underdetermined system: {} rows for {} terms",
            n, p
        )));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(VelostatError::Fit("non-finite response value".to_string()));
    }
    for j in 0..p {
        for i in 0..n {
            if !x[(i, j)].is_finite() {
                return Err(VelostatError::Fit(format!(
                    "non-finite value in design column '{}'",
                    terms[j]
                )));
            }
        }
    }

    // Normal equations: X'X b = X'y
    let xtx = x.transpose() * x;
    let xty: Vec<f64> = (0..p)
        .map(|j| (0..n).map(|i| x[(i, j)] * y[i]).sum())
        .collect();

    let factor = cholesky_factor(&xtx).ok_or_else(|| {
        VelostatError::Fit(
            "design matrix is singular or rank-deficient (collinear terms)".to_string(),
        )
    })?;

    let beta = solve_with_factor(&factor, &xty);

    // Diagonal of (X'X)^-1 drives the standard errors
    let inv_diag: Vec<f64> = (0..p)
        .map(|j| {
            let mut unit = vec![0.0; p];
            unit[j] = 1.0;
            solve_with_factor(&factor, &unit)[j]
        })
        .collect();

    let rss: f64 = (0..n)
        .map(|i| {
            let fitted: f64 = (0..p).map(|j| beta[j] * x[(i, j)]).sum();
            (y[i] - fitted).powi(2)
        })
        .sum();
    let residual_df = n - p;
    let sigma2 = rss / residual_df as f64;

    let t_dist = StudentsT::new(0.0, 1.0, residual_df as f64)
        .map_err(|e| VelostatError::Fit(format!("invalid residual distribution: {}", e)))?;

    let coefficients = terms
        .iter()
        .enumerate()
        .map(|(j, term)| {
            let variance = (sigma2 * inv_diag[j]).max(0.0);
            let std_error = variance.sqrt();
            let t_value = if std_error > 0.0 {
                beta[j] / std_error
            } else {
                f64::NAN
            };
            let p_value = if t_value.is_finite() {
                2.0 * (1.0 - t_dist.cdf(t_value.abs()))
            } else {
                f64::NAN
            };
            Coefficient {
                term: term.clone(),
                estimate: beta[j],
                std_error,
                t_value,
                p_value,
            }
        })
        .collect();

    Ok(OlsFit {
        coefficients,
        residual_df,
        beta,
    })
}

/// Lower-triangular Cholesky factor of a symmetric positive-definite
/// matrix, or None when a pivot falls at or below the relative tolerance
/// (the rank-deficiency signal).
fn cholesky_factor(a: &Mat<f64>) -> Option<Mat<f64>> {
    let n = a.nrows();
    let scale = (0..n).map(|j| a[(j, j)].abs()).fold(1.0f64, f64::max);

    let mut l = Mat::<f64>::zeros(n, n);
    for j in 0..n {
        let mut diag = a[(j, j)];
        for k in 0..j {
            diag -= l[(j, k)] * l[(j, k)];
        }
        if !diag.is_finite() || diag <= PIVOT_TOLERANCE * scale {
            return None;
        }
        let root = diag.sqrt();
        l[(j, j)] = root;
        for i in (j + 1)..n {
            let mut v = a[(i, j)];
            for k in 0..j {
                v -= l[(i, k)] * l[(j, k)];
            }
            l[(i, j)] = v / root;
        }
    }
    Some(l)
}

/// Solve L L' z = b by forward then back substitution.
fn solve_with_factor(l: &Mat<f64>, b: &[f64]) -> Vec<f64> {
    let n = l.nrows();

    let mut w = vec![0.0; n];
    for i in 0..n {
        let mut v = b[i];
        for k in 0..i {
            v -= l[(i, k)] * w[k];
        }
        w[i] = v / l[(i, i)];
    }

    let mut z = vec![0.0; n];
    for i in (0..n).rev() {
        let mut v = w[i];
        for k in (i + 1)..n {
            v -= l[(k, i)] * z[k];
        }
        z[i] = v / l[(i, i)];
    }
    z
}

/// Root mean squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    let mse = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    mse.sqrt()
}

/// Coefficient of determination. NaN when the actual values are constant.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let tss: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if tss == 0.0 {
        return f64::NAN;
    }
    let rss: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    1.0 - rss / tss
}
