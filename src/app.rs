//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments and resolves the run config
//! - runs the regression batch
//! - prints reports and writes optional exports

use std::fs::File;

use clap::Parser;
use log::warn;

use crate::cli::{Command, LogLevel, RunArgs, SampleArgs, SpecsArgs};
use crate::data::{SampleConfig, generate_panel, write_dataset_csv};
use crate::domain::{DatasetSource, RunConfig};
use crate::error::AppError;
use crate::io::{
    read_run_config, resolve_config_path, write_coefficients_csv, write_outcomes_json, write_run_config,
};

pub mod pipeline;

/// Exit code for `--strict` runs in which at least one regression failed.
const EXIT_PARTIAL_FAILURE: u8 = 5;

/// Entry point for the `tols` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.log_level);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Sample(args) => handle_sample(args),
        Command::Specs(args) => handle_specs(args),
    }
}

fn init_logging(level: Option<LogLevel>) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level.to_filter());
    }
    // Ignore double initialisation (tests may call `run` paths repeatedly).
    let _ = builder.try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_batch(&config)?;

    if !args.quiet {
        print!("{}", crate::report::format_outcomes(&run.outcomes));
    }
    println!("{}", crate::report::format_tally(&run.tally));

    if let Some(path) = &args.export_json {
        write_outcomes_json(path, &run.outcomes)?;
    }
    if let Some(path) = &args.export_csv {
        write_coefficients_csv(path, &run.outcomes)?;
    }

    if args.strict && run.tally.failed > 0 {
        return Err(AppError::new(
            EXIT_PARTIAL_FAILURE,
            format!("{} of {} regressions failed.", run.tally.failed, run.tally.total),
        ));
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        years: args.years,
        first_year: args.first_year,
        mou_year: args.mou_year,
        seed: args.seed,
        missing_prob: args.missing_prob,
        non_positive_prob: args.non_positive_prob,
    };
    let id = DatasetSource::from_path(&args.out).dataset_id();
    let panel = generate_panel(&id, &config)?;

    let file = File::create(&args.out)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", args.out.display())))?;
    write_dataset_csv(file, &panel.dataset)?;

    println!(
        "Wrote {} rows x {} columns to {}",
        panel.dataset.n_rows(),
        panel.dataset.columns().len(),
        args.out.display()
    );
    Ok(())
}

fn handle_specs(args: SpecsArgs) -> Result<(), AppError> {
    let config = match resolve_config_path(args.config.as_deref()) {
        Some(path) => read_run_config(&path)?,
        None => RunConfig::default(),
    };
    if let Some(out) = &args.out {
        write_run_config(out, &config)?;
        println!("Wrote {} spec(s) to {}", config.specs.len(), out.display());
        return Ok(());
    }
    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| AppError::new(4, format!("Failed to serialize config: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Resolve the run config: file (flag or `TOLS_CONFIG`) or defaults, then CLI overrides.
pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let mut config = match resolve_config_path(args.config.as_deref()) {
        Some(path) => read_run_config(&path)?,
        None => RunConfig::default(),
    };

    if !args.datasets.is_empty() {
        if !config.datasets.is_empty() {
            warn!(
                "{} dataset(s) from the command line replace {} listed in the config",
                args.datasets.len(),
                config.datasets.len()
            );
        }
        config.datasets = args.datasets.iter().map(DatasetSource::from_path).collect();
    }
    if let Some(eps) = args.epsilon {
        config.prep.epsilon = eps;
    }
    if let Some(col) = &args.trade_column {
        config.prep.trade_value_column = Some(col.clone());
    }
    config.parallel |= args.parallel;

    config.validate()?;
    Ok(config)
}

/// Rewrite argv so bare dataset paths mean `run`.
///
/// Rules:
/// - `tols a.csv b.csv`         -> `tols run a.csv b.csv`
/// - `tols --help/--version/-h` -> unchanged (show top-level help/version)
/// - anything starting with a subcommand or a flag -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_subcommand = matches!(arg1.as_str(), "run" | "sample" | "specs" | "help");
    if is_subcommand || arg1.starts_with('-') {
        return argv;
    }

    argv.insert(1, "run".to_string());
    argv
}
