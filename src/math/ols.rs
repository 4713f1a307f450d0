//! Ordinary least squares with classical inference.
//!
//! We solve `min ‖y − Xβ‖²` through a thin QR factorization `X = QR`:
//!
//! ```text
//! β          = R⁻¹ Qᵀ y
//! (XᵀX)⁻¹    = R⁻¹ R⁻ᵀ
//! ```
//!
//! so the normal equations are never formed explicitly (forming `XᵀX` squares
//! the condition number). All statistics follow the textbook definitions:
//! `df_resid = n − k`, `df_model = k − 1` (the first column is the intercept),
//! `σ̂² = RSS / df_resid`, two-sided Student-t p-values and an overall F-test.

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::design::DesignMatrix;
use crate::domain::RegressionResult;
use crate::error::RegressionError;
use crate::math::SINGULAR_TOL;

/// Two-sided confidence level for coefficient intervals.
const CONF_LEVEL: f64 = 0.95;

/// Fit an OLS model and compute the full set of inferential statistics.
pub fn fit_ols(design: &DesignMatrix) -> Result<RegressionResult, RegressionError> {
    let x = &design.x;
    let y = &design.y;
    let n = x.nrows();
    let k = x.ncols();

    if y.len() != n {
        return Err(RegressionError::fit_failure(format!(
            "response has {} rows but design has {n}",
            y.len()
        )));
    }
    if k == 0 {
        return Err(RegressionError::fit_failure("design matrix has no columns"));
    }
    if n <= k {
        return Err(RegressionError::fit_failure(format!(
            "no residual degrees of freedom (n={n}, k={k})"
        )));
    }

    let (beta, xtx_inv) = solve_qr(x, y)?;

    let residuals = y - x * &beta;
    let rss = residuals.dot(&residuals);
    let y_mean = y.mean();
    let tss = y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>();

    let df_resid = n - k;
    let df_model = k - 1;
    let sigma2 = rss / df_resid as f64;

    let std_errors: Vec<f64> = (0..k).map(|i| (sigma2 * xtx_inv[(i, i)]).sqrt()).collect();
    let coefficients: Vec<f64> = beta.iter().copied().collect();
    let t_stats: Vec<f64> = coefficients
        .iter()
        .zip(&std_errors)
        .map(|(b, se)| b / se)
        .collect();

    let t_dist = StudentsT::new(0.0, 1.0, df_resid as f64)
        .map_err(|e| RegressionError::fit_failure(format!("Student-t distribution error: {e}")))?;
    let p_values: Vec<f64> = t_stats.iter().map(|t| two_sided_p(&t_dist, *t)).collect();

    let t_crit = t_dist.inverse_cdf(0.5 + CONF_LEVEL / 2.0);
    let conf_int: Vec<(f64, f64)> = coefficients
        .iter()
        .zip(&std_errors)
        .map(|(b, se)| (b - t_crit * se, b + t_crit * se))
        .collect();

    let r_squared = 1.0 - rss / tss;
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / df_resid as f64;

    let (f_statistic, f_p_value) = f_test(tss, rss, df_model, df_resid)?;

    let nf = n as f64;
    let log_likelihood = -0.5 * nf * ((2.0 * std::f64::consts::PI).ln() + (rss / nf).ln() + 1.0);
    let aic = -2.0 * log_likelihood + 2.0 * k as f64;
    let bic = -2.0 * log_likelihood + k as f64 * nf.ln();

    Ok(RegressionResult {
        names: design.names.clone(),
        coefficients,
        std_errors,
        t_stats,
        p_values,
        conf_int,
        nobs: n,
        df_model,
        df_resid,
        rss,
        tss,
        sigma2,
        r_squared,
        adj_r_squared,
        f_statistic,
        f_p_value,
        log_likelihood,
        aic,
        bic,
        residuals: residuals.iter().copied().collect(),
    })
}

/// Solve for β and `(XᵀX)⁻¹` from a thin QR factorization of `x`.
fn solve_qr(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(DVector<f64>, DMatrix<f64>), RegressionError> {
    let k = x.ncols();
    let qr = x.clone().qr();
    let r = qr.r();
    let q = qr.q();

    let diag_max = r.diagonal().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if !(diag_max.is_finite() && diag_max > 0.0) {
        return Err(RegressionError::fit_failure("QR factorization produced a zero or non-finite R"));
    }
    if let Some(j) = r.diagonal().iter().position(|v| v.abs() <= SINGULAR_TOL * diag_max) {
        return Err(RegressionError::fit_failure(format!(
            "design is numerically singular at column {j}"
        )));
    }

    let qty = q.transpose() * y;
    let beta = r
        .solve_upper_triangular(&qty)
        .ok_or_else(|| RegressionError::fit_failure("triangular solve for coefficients failed"))?;
    let r_inv = r
        .solve_upper_triangular(&DMatrix::identity(k, k))
        .ok_or_else(|| RegressionError::fit_failure("triangular inverse of R failed"))?;
    let xtx_inv = &r_inv * r_inv.transpose();

    if !beta.iter().all(|v| v.is_finite()) {
        return Err(RegressionError::fit_failure("non-finite coefficient estimate"));
    }
    Ok((beta, xtx_inv))
}

fn two_sided_p(dist: &StudentsT, t: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    (2.0 * dist.sf(t.abs())).min(1.0)
}

fn f_test(tss: f64, rss: f64, df_model: usize, df_resid: usize) -> Result<(f64, f64), RegressionError> {
    if df_model == 0 {
        return Ok((f64::NAN, f64::NAN));
    }
    let f = ((tss - rss) / df_model as f64) / (rss / df_resid as f64);
    if f.is_nan() {
        return Ok((f, f64::NAN));
    }
    let dist = FisherSnedecor::new(df_model as f64, df_resid as f64)
        .map_err(|e| RegressionError::fit_failure(format!("F distribution error: {e}")))?;
    let p = if f.is_infinite() { 0.0 } else { dist.sf(f.max(0.0)) };
    Ok((f, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design(x: DMatrix<f64>, y: DVector<f64>) -> DesignMatrix {
        let names = (0..x.ncols()).map(|j| format!("x{j}")).collect();
        DesignMatrix { names, x, y }
    }

    #[test]
    fn simple_regression_matches_hand_computation() {
        // y on [1, x] with x = 1..5, y = [1, 3, 2, 5, 4]:
        // slope = Sxy/Sxx = 8/10, intercept = 3 - 0.8*3, RSS = 3.6, TSS = 10.
        let x = DMatrix::from_fn(5, 2, |i, j| if j == 0 { 1.0 } else { (i + 1) as f64 });
        let y = DVector::from_row_slice(&[1.0, 3.0, 2.0, 5.0, 4.0]);
        let fit = fit_ols(&design(x, y)).unwrap();

        assert!((fit.coefficients[0] - 0.6).abs() < 1e-12);
        assert!((fit.coefficients[1] - 0.8).abs() < 1e-12);
        assert!((fit.rss - 3.6).abs() < 1e-12);
        assert!((fit.tss - 10.0).abs() < 1e-12);
        assert_eq!(fit.df_resid, 3);
        assert_eq!(fit.df_model, 1);
        assert!((fit.sigma2 - 1.2).abs() < 1e-12);
        assert!((fit.r_squared - 0.64).abs() < 1e-12);
        assert!((fit.adj_r_squared - 0.52).abs() < 1e-12);

        assert!((fit.std_errors[1] - (1.2f64 / 10.0).sqrt()).abs() < 1e-12);
        assert!((fit.std_errors[0] - (1.2f64 * 1.1).sqrt()).abs() < 1e-12);

        // With one regressor the F-test is the squared slope t-test.
        assert!((fit.f_statistic - 6.4 / 1.2).abs() < 1e-10);
        assert!((fit.f_statistic - fit.t_stats[1].powi(2)).abs() < 1e-10);
        assert!((fit.f_p_value - fit.p_values[1]).abs() < 1e-8);
        // Two-sided t(3) tail at t = 0.8 / sqrt(0.12) = 2.3094.
        assert!((fit.p_values[1] - 0.104088).abs() < 1e-6, "p={}", fit.p_values[1]);

        let (lo, hi) = fit.conf_int[1];
        assert!(lo < 0.8 && 0.8 < hi);
        assert!(((hi - lo) / 2.0 / fit.std_errors[1] - 3.182446).abs() < 1e-4);

        let expected_ll = -2.5 * ((2.0 * std::f64::consts::PI).ln() + (0.72f64).ln() + 1.0);
        assert!((fit.log_likelihood - expected_ll).abs() < 1e-10);
        assert!((fit.aic - (-2.0 * expected_ll + 4.0)).abs() < 1e-10);
        assert!((fit.bic - fit.aic - (2.0 * 5f64.ln() - 4.0)).abs() < 1e-10);
    }

    #[test]
    fn orthonormal_noise_free_design_recovers_beta_exactly() {
        // Columns of a scaled 4×4 Hadamard matrix are orthonormal.
        let h = [
            [1.0, 1.0, 1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, -1.0],
            [1.0, -1.0, -1.0],
        ];
        let x = DMatrix::from_fn(4, 3, |i, j| h[i][j] * 0.5);
        let beta = DVector::from_row_slice(&[2.0, -1.5, 0.75]);
        let y = &x * &beta;

        let fit = fit_ols(&design(x, y)).unwrap();
        for (got, want) in fit.coefficients.iter().zip(beta.iter()) {
            assert!((got - want).abs() < 1e-12, "got {got}, want {want}");
        }
        assert!(fit.rss.abs() < 1e-20);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!(fit.residuals.iter().all(|e| e.abs() < 1e-12));
    }

    #[test]
    fn near_collinear_regressors_still_fit() {
        let n = 40;
        let x = DMatrix::from_fn(n, 3, |i, j| {
            let t = i as f64 / n as f64;
            match j {
                0 => 1.0,
                1 => t,
                _ => t + 1e-6 * ((i as f64) * 1.3).sin(),
            }
        });
        let beta = DVector::from_row_slice(&[1.0, 2.0, -3.0]);
        let y = &x * &beta;
        let fit = fit_ols(&design(x, y)).unwrap();
        for (got, want) in fit.coefficients.iter().zip(beta.iter()) {
            assert!((got - want).abs() < 1e-4, "got {got}, want {want}");
        }
    }

    #[test]
    fn exactly_singular_design_is_fit_failure() {
        let x = DMatrix::from_fn(6, 3, |i, j| match j {
            0 => 1.0,
            _ => i as f64,
        });
        let y = DVector::from_fn(6, |i, _| i as f64);
        let err = fit_ols(&design(x, y)).unwrap_err();
        assert!(matches!(err, RegressionError::FitFailure { .. }));
    }

    #[test]
    fn no_residual_degrees_of_freedom_is_fit_failure() {
        let x = DMatrix::from_fn(2, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let y = DVector::from_row_slice(&[1.0, 2.0]);
        let err = fit_ols(&design(x, y)).unwrap_err();
        assert!(err.to_string().contains("degrees of freedom"));
    }

    #[test]
    fn identical_input_gives_bitwise_identical_output() {
        let x = DMatrix::from_fn(25, 3, |i, j| match j {
            0 => 1.0,
            1 => (i as f64 * 0.37).sin(),
            _ => (i as f64).sqrt(),
        });
        let y = DVector::from_fn(25, |i, _| 0.3 * i as f64 + (i as f64 * 1.7).cos());
        let a = fit_ols(&design(x.clone(), y.clone())).unwrap();
        let b = fit_ols(&design(x, y)).unwrap();
        assert_eq!(a, b);
    }
}
