//! Shared "batch" logic used by the CLI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! config -> dataset load -> prepare/design/fit per pair -> tally
//!
//! The CLI can then focus on presentation (printing and exports).

use log::info;

use crate::domain::{RegressionOutcome, RunConfig};
use crate::error::AppError;
use crate::fit::{DatasetJob, RunOptions, RunTally, run_regressions};
use crate::io::load_dataset;

/// All computed outputs of a single `tols run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub outcomes: Vec<RegressionOutcome>,
    pub tally: RunTally,
}

/// Load every configured dataset and run the batch.
pub fn run_batch(config: &RunConfig) -> Result<RunOutput, AppError> {
    config.validate()?;
    let jobs = load_jobs(config)?;
    Ok(run_jobs(&jobs, config))
}

/// Load datasets in configured order, pairing each with its prep settings.
pub fn load_jobs(config: &RunConfig) -> Result<Vec<DatasetJob>, AppError> {
    if config.datasets.is_empty() {
        return Err(AppError::new(2, "No datasets given (pass CSV paths or list them in the config)."));
    }

    config
        .datasets
        .iter()
        .map(|source| {
            let dataset = load_dataset(source)?;
            info!(
                "loaded dataset '{}' ({} rows, {} columns) from {}",
                dataset.id(),
                dataset.n_rows(),
                dataset.columns().len(),
                source.path.display()
            );
            let prep = source.resolve_prep(&config.prep);
            prep.validate()?;
            Ok(DatasetJob { dataset, prep })
        })
        .collect()
}

/// Run already-loaded jobs with the configured specs.
pub fn run_jobs(jobs: &[DatasetJob], config: &RunConfig) -> RunOutput {
    let outcomes = run_regressions(
        jobs,
        &config.specs,
        RunOptions {
            parallel: config.parallel,
        },
    );
    let tally = RunTally::from_outcomes(&outcomes);
    RunOutput { outcomes, tally }
}
