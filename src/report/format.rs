//! Formatted terminal output for regression outcomes.
//!
//! Formatting lives here so the estimation code stays free of presentation and
//! output changes stay localized. The layout is the conventional OLS summary:
//! a header block of fit statistics, then a coefficient table with 95%
//! intervals.

use crate::domain::{PrepSummary, RegressionOutcome, RegressionResult};
use crate::fit::RunTally;

const RULE_WIDTH: usize = 86;

/// Format every outcome, grouped under a banner per dataset.
pub fn format_outcomes(outcomes: &[RegressionOutcome]) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;

    for outcome in outcomes {
        if current != Some(outcome.dataset()) {
            current = Some(outcome.dataset());
            out.push_str(&"=".repeat(RULE_WIDTH));
            out.push('\n');
            out.push_str(&format!("Dataset: {}\n", outcome.dataset()));
            out.push_str(&"=".repeat(RULE_WIDTH));
            out.push_str("\n\n");
        }
        out.push_str(&format_outcome(outcome));
        out.push('\n');
    }
    out
}

/// Format a single outcome.
pub fn format_outcome(outcome: &RegressionOutcome) -> String {
    match outcome {
        RegressionOutcome::Success { spec, prep, result, .. } => format_result(spec, prep, result),
        RegressionOutcome::Failure(f) => format!(
            "Error fitting {} on {}: [{}] {}\n",
            f.spec, f.dataset, f.kind, f.message
        ),
    }
}

fn format_result(spec: &str, prep: &PrepSummary, r: &RegressionResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:^width$}\n", "OLS Regression Results", width = RULE_WIDTH));
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');
    out.push_str(&two_col("Spec:", spec, "R-squared:", &fmt_stat(r.r_squared)));
    out.push_str(&two_col(
        "No. Observations:",
        &r.nobs.to_string(),
        "Adj. R-squared:",
        &fmt_stat(r.adj_r_squared),
    ));
    out.push_str(&two_col(
        "Df Residuals:",
        &r.df_resid.to_string(),
        "F-statistic:",
        &fmt_stat(r.f_statistic),
    ));
    out.push_str(&two_col(
        "Df Model:",
        &r.df_model.to_string(),
        "Prob (F-statistic):",
        &fmt_p(r.f_p_value),
    ));
    out.push_str(&two_col(
        "Rows used/read:",
        &format!("{}/{}", prep.rows_used, prep.rows_read),
        "Log-Likelihood:",
        &fmt_stat(r.log_likelihood),
    ));
    out.push_str(&two_col(
        "Trade values floored:",
        &prep.floored.to_string(),
        "AIC:",
        &fmt_stat(r.aic),
    ));
    out.push_str(&two_col("", "", "BIC:", &fmt_stat(r.bic)));
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');

    out.push_str(
        format!(
            "{:<24} {:>10} {:>10} {:>8} {:>8} {:>10} {:>10}",
            "", "coef", "std err", "t", "P>|t|", "[0.025", "0.975]"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');
    for row in r.coefficient_rows() {
        out.push_str(&format!(
            "{:<24} {:>10} {:>10} {:>8} {:>8} {:>10} {:>10}\n",
            truncate(&row.name, 24),
            fmt_coef(row.estimate),
            fmt_coef(row.std_error),
            fmt_t(row.t_stat),
            fmt_p(row.p_value),
            fmt_coef(row.ci_lower),
            fmt_coef(row.ci_upper),
        ));
    }
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');
    out
}

/// One-line summary of a finished batch.
pub fn format_tally(tally: &RunTally) -> String {
    if tally.failed == 0 {
        format!("All {} regressions completed.", tally.total)
    } else {
        format!(
            "{} of {} regressions completed; {} failed.",
            tally.succeeded, tally.total, tally.failed
        )
    }
}

fn two_col(l_key: &str, l_val: &str, r_key: &str, r_val: &str) -> String {
    let line = format!(
        "{:<22}{:>20}   {:<22}{:>19}",
        l_key,
        truncate(l_val, 20),
        r_key,
        r_val
    );
    format!("{}\n", line.trim_end())
}

fn fmt_stat(v: f64) -> String {
    if v.is_finite() { format!("{v:.3}") } else { "nan".to_string() }
}

fn fmt_coef(v: f64) -> String {
    if !v.is_finite() {
        return "nan".to_string();
    }
    if v != 0.0 && (v.abs() >= 1e6 || v.abs() < 1e-3) {
        format!("{v:.3e}")
    } else {
        format!("{v:.4}")
    }
}

fn fmt_t(v: f64) -> String {
    if v.is_finite() { format!("{v:.3}") } else { "nan".to_string() }
}

fn fmt_p(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v < 1e-3 {
        format!("{v:.2e}")
    } else {
        format!("{v:.3}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
