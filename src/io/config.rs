//! Run configuration file (JSON).
//!
//! The file mirrors [`RunConfig`]; any field left out takes its default, so
//! `{}` is a valid config that runs the two standard MoU regressions.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::domain::RunConfig;
use crate::error::AppError;

/// Environment variable naming a default config file.
pub const CONFIG_ENV: &str = "TOLS_CONFIG";

/// Read and validate a run config.
pub fn read_run_config(path: &Path) -> Result<RunConfig, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open config '{}': {e}", path.display())))?;
    let mut config: RunConfig = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid config JSON '{}': {e}", path.display())))?;

    // Dataset paths in the file are relative to the file itself.
    if let Some(base) = path.parent() {
        for source in &mut config.datasets {
            if source.path.is_relative() {
                source.path = base.join(&source.path);
            }
        }
    }

    config.validate()?;
    Ok(config)
}

/// Config path from an explicit flag, falling back to `TOLS_CONFIG`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

/// Write a config as pretty JSON.
pub fn write_run_config(path: &Path, config: &RunConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create config '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, config)
        .map_err(|e| AppError::new(2, format!("Failed to write config JSON: {e}")))?;
    Ok(())
}
