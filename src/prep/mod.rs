//! Data preparation: row filtering, trade-value flooring and the log transform.
//!
//! Steps, in order:
//!
//! 1. every required column (and the trade-value column, if any) must exist in
//!    the schema, otherwise the whole dataset fails with a schema error
//! 2. keep rows where every required column holds a present value (NaN counts
//!    as missing), preserving row order
//! 3. if any retained trade value is `<= 0`, clip the whole column from below at
//!    `epsilon`. This alters data and is logged at `warn` level
//! 4. append `ln(trade value)` as the derived log column
//!
//! The input dataset is never modified; a new one is returned.

use log::{debug, warn};

use crate::domain::{Dataset, PrepConfig, PrepSummary, Value};
use crate::error::RegressionError;

/// A filtered, transformed dataset plus counts describing what happened.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub dataset: Dataset,
    pub summary: PrepSummary,
}

/// Run data preparation for one dataset.
pub fn prepare(dataset: &Dataset, config: &PrepConfig) -> Result<PreparedDataset, RegressionError> {
    let required: Vec<usize> = config
        .required_columns
        .iter()
        .map(|name| dataset.require_column(name))
        .collect::<Result<_, _>>()?;
    if let Some(col) = &config.trade_value_column {
        dataset.require_column(col)?;
    }

    let filtered = dataset.retain_rows(|row| required.iter().all(|&idx| is_present(row[idx])));
    let mut summary = PrepSummary {
        rows_read: dataset.n_rows(),
        rows_used: filtered.n_rows(),
        floored: 0,
    };
    debug!(
        "dataset '{}': kept {} of {} rows after missing-value filter",
        dataset.id(),
        summary.rows_used,
        summary.rows_read
    );

    let Some(trade_col) = &config.trade_value_column else {
        return Ok(PreparedDataset {
            dataset: filtered,
            summary,
        });
    };

    let (trade, floored) = floor_non_positive(filtered.column(trade_col)?, config.epsilon);
    if floored > 0 {
        warn!(
            "dataset '{}': {floored} value(s) of `{trade_col}` below {} clipped to {} before log transform",
            dataset.id(),
            config.epsilon,
            config.epsilon
        );
    }
    summary.floored = floored;

    let logged: Vec<Value> = trade.iter().map(|v| v.map(f64::ln)).collect();
    let dataset = filtered
        .with_column(trade_col, trade)
        .with_column(&config.log_column, logged);

    Ok(PreparedDataset { dataset, summary })
}

pub(crate) fn is_present(v: Value) -> bool {
    matches!(v, Some(x) if !x.is_nan())
}

/// Clip values at `eps` from below, but only when at least one present value is
/// non-positive. Returns the new column and the number of values changed.
fn floor_non_positive(values: Vec<Value>, eps: f64) -> (Vec<Value>, usize) {
    let any_non_positive = values.iter().any(|v| matches!(v, Some(x) if *x <= 0.0));
    if !any_non_positive {
        return (values, 0);
    }

    let mut changed = 0usize;
    let out = values
        .into_iter()
        .map(|v| match v {
            Some(x) if x < eps => {
                changed += 1;
                Some(eps)
            }
            other => other,
        })
        .collect();
    (out, changed)
}
