//! Command-line parsing for the trade-policy OLS runner.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! estimation code; dispatch lives in `app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tols", version, about = "OLS regressions for trade-policy panel datasets")]
pub struct Cli {
    /// Log verbosity (overrides `RUST_LOG`).
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit every configured spec against every dataset and print the results.
    Run(RunArgs),
    /// Write a synthetic trade panel CSV with the standard study columns.
    Sample(SampleArgs),
    /// Print the effective run configuration as JSON.
    Specs(SpecsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Options for `tols run`.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Dataset CSV files, processed in the order given. Replaces any datasets
    /// listed in the config file.
    #[arg(value_name = "CSV")]
    pub datasets: Vec<PathBuf>,

    /// Run configuration JSON (specs, prep settings, datasets).
    /// Falls back to `TOLS_CONFIG`, then to the built-in MoU study specs.
    #[arg(short, long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Floor for non-positive trade values before the log transform.
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Name of the trade value column to floor and log.
    #[arg(long = "trade-column")]
    pub trade_column: Option<String>,

    /// Fit specs in parallel (output order is unchanged).
    #[arg(long)]
    pub parallel: bool,

    /// Exit non-zero if any regression failed.
    #[arg(long)]
    pub strict: bool,

    /// Suppress the per-regression report (tally and exports only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Export all outcomes to JSON.
    #[arg(long = "export-json", value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Export a tidy coefficient table to CSV.
    #[arg(long = "export-csv", value_name = "PATH")]
    pub export_csv: Option<PathBuf>,
}

/// Options for `tols sample`.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,

    /// Years per partner country.
    #[arg(long, default_value_t = 24)]
    pub years: usize,

    /// First year of the panel.
    #[arg(long, default_value_t = 2000)]
    pub first_year: i32,

    /// First year in which the MoU applies.
    #[arg(long, default_value_t = 2012)]
    pub mou_year: i32,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Probability of blanking any regressor cell.
    #[arg(long, default_value_t = 0.02)]
    pub missing_prob: f64,

    /// Probability of a zero or negative trade value.
    #[arg(long, default_value_t = 0.03)]
    pub non_positive_prob: f64,
}

/// Options for `tols specs`.
#[derive(Debug, Parser, Clone)]
pub struct SpecsArgs {
    /// Run configuration JSON to resolve.
    #[arg(short, long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Write the config to this file instead of printing it.
    #[arg(short, long, value_name = "JSON")]
    pub out: Option<PathBuf>,
}
