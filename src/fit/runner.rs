//! Batch orchestration over (dataset, spec) pairs.
//!
//! For each dataset (in input order) we run data preparation once, then build a
//! design matrix and fit OLS for each spec (in input order). Any failure is
//! recorded as a failure outcome for that pair and the batch moves on; a
//! schema error in preparation fails every spec of that dataset.
//!
//! A spec's own `required_columns` narrow only that spec's rows. They are
//! checked per pair, so a column one spec needs never fails or filters a
//! sibling spec on the same dataset.
//!
//! The output always has `datasets.len() * specs.len()` entries in
//! `(dataset, spec)` order, whether or not `parallel` is set.

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::design::build_design;
use crate::domain::{Dataset, OutcomeFailure, PrepConfig, PrepSummary, RegressionOutcome, RegressionResult, RegressionSpec};
use crate::error::RegressionError;
use crate::math::fit_ols;
use crate::prep::{PreparedDataset, is_present, prepare};

/// A loaded dataset and the preparation settings that apply to it.
#[derive(Debug, Clone)]
pub struct DatasetJob {
    pub dataset: Dataset,
    pub prep: PrepConfig,
}

/// Execution options for [`run_regressions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Fit specs on the rayon pool.
    pub parallel: bool,
}

/// Fit every spec against every dataset and return one outcome per pair.
pub fn run_regressions(jobs: &[DatasetJob], specs: &[RegressionSpec], opts: RunOptions) -> Vec<RegressionOutcome> {
    let mut outcomes = Vec::with_capacity(jobs.len() * specs.len());

    for job in jobs {
        let id = job.dataset.id();
        info!("running {} spec(s) on dataset '{id}'", specs.len());

        let prepared = match prepare(&job.dataset, &job.prep) {
            Ok(p) => p,
            Err(err) => {
                warn!("dataset '{id}': preparation failed: {err}");
                outcomes.extend(specs.iter().map(|spec| failure(id, &spec.id, &err)));
                continue;
            }
        };

        if opts.parallel {
            let batch: Vec<RegressionOutcome> = specs.par_iter().map(|spec| run_pair(&prepared, spec)).collect();
            outcomes.extend(batch);
        } else {
            outcomes.extend(specs.iter().map(|spec| run_pair(&prepared, spec)));
        }
    }

    outcomes
}

/// Design + fit for one pair on an already prepared dataset.
pub fn run_pair(prepared: &PreparedDataset, spec: &RegressionSpec) -> RegressionOutcome {
    let id = prepared.dataset.id();
    debug!("fitting spec '{}' on dataset '{id}'", spec.id);

    match fit_spec(prepared, spec) {
        Ok((prep, result)) => RegressionOutcome::Success {
            dataset: id.to_string(),
            spec: spec.id.clone(),
            prep,
            result,
        },
        Err(err) => {
            warn!("dataset '{id}', spec '{}': {err}", spec.id);
            failure(id, &spec.id, &err)
        }
    }
}

fn fit_spec(prepared: &PreparedDataset, spec: &RegressionSpec) -> Result<(PrepSummary, RegressionResult), RegressionError> {
    let narrowed;
    let view = if spec.required_columns.is_empty() {
        prepared
    } else {
        narrowed = narrow_to_spec(prepared, spec)?;
        &narrowed
    };
    let design = build_design(&view.dataset, spec)?;
    Ok((view.summary, fit_ols(&design)?))
}

/// Rows of `prepared` that also hold every spec-level required column.
fn narrow_to_spec(prepared: &PreparedDataset, spec: &RegressionSpec) -> Result<PreparedDataset, RegressionError> {
    let required: Vec<usize> = spec
        .required_columns
        .iter()
        .map(|name| prepared.dataset.require_column(name))
        .collect::<Result<_, _>>()?;

    let dataset = prepared
        .dataset
        .retain_rows(|row| required.iter().all(|&idx| is_present(row[idx])));
    debug!(
        "dataset '{}', spec '{}': {} of {} prepared rows hold the spec's required columns",
        prepared.dataset.id(),
        spec.id,
        dataset.n_rows(),
        prepared.dataset.n_rows()
    );
    let summary = PrepSummary {
        rows_used: dataset.n_rows(),
        ..prepared.summary
    };
    Ok(PreparedDataset { dataset, summary })
}

fn failure(dataset: &str, spec: &str, err: &RegressionError) -> RegressionOutcome {
    RegressionOutcome::Failure(OutcomeFailure::from_error(dataset, spec, err))
}

/// Tally of a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunTally {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunTally {
    pub fn from_outcomes(outcomes: &[RegressionOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }
}
