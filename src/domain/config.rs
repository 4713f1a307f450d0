//! Run configuration.
//!
//! Everything the estimation core needs to know about *which* models to fit and
//! *how* to prepare each dataset is enumerated here before any computation
//! starts. Defaults reproduce the trade-policy study the tool was built for
//! (MoU dummies, import share and geopolitical risk regressors).

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::RegressionSpec;
use crate::error::AppError;

/// Floor applied to non-positive trade values before the log transform.
pub const DEFAULT_EPSILON: f64 = 1e-6;

pub const DEFAULT_TRADE_VALUE_COLUMN: &str = "Trade Value";
pub const DEFAULT_LOG_COLUMN: &str = "Log_Trade_Value";

/// Columns that must be present in a row for it to be used by any model.
pub const DEFAULT_REQUIRED_COLUMNS: [&str; 13] = [
    "Trade Value",
    "Producer Prices",
    "Country Dummy",
    "Post MoU Dummy",
    "MoU in Effect Dummy",
    "Export Share",
    "GPR_world",
    "GPR_importer",
    "GPR_exporter",
    "Import Share",
    "PS_exporter",
    "PS_importer",
    "MoU * Import Share",
];

pub const DEFAULT_REGRESSORS: [&str; 5] = [
    "Country Dummy",
    "Post MoU Dummy",
    "MoU in Effect Dummy",
    "Import Share",
    "GPR_importer",
];

/// Per-dataset preparation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    pub required_columns: Vec<String>,
    /// Column to floor and log-transform. `None` disables the transform.
    pub trade_value_column: Option<String>,
    /// Name of the derived `ln(trade value)` column.
    pub log_column: String,
    pub epsilon: f64,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            required_columns: DEFAULT_REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            trade_value_column: Some(DEFAULT_TRADE_VALUE_COLUMN.to_string()),
            log_column: DEFAULT_LOG_COLUMN.to_string(),
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl PrepConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(AppError::new(
                2,
                format!("Invalid epsilon {}: must be finite and > 0.", self.epsilon),
            ));
        }
        if self.trade_value_column.is_some() && self.log_column.trim().is_empty() {
            return Err(AppError::new(2, "Log column name must not be empty."));
        }
        Ok(())
    }
}

/// A dataset to load, with optional overrides of the run-wide prep settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub path: PathBuf,
    /// Identifier used in outcomes. Defaults to the file stem.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub required_columns: Option<Vec<String>>,
    #[serde(default)]
    pub trade_value_column: Option<String>,
}

impl DatasetSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            id: None,
            required_columns: None,
            trade_value_column: None,
        }
    }

    pub fn dataset_id(&self) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Effective prep settings for this source.
    pub fn resolve_prep(&self, base: &PrepConfig) -> PrepConfig {
        let mut prep = base.clone();
        if let Some(cols) = &self.required_columns {
            prep.required_columns = cols.clone();
        }
        if let Some(col) = &self.trade_value_column {
            prep.trade_value_column = Some(col.clone());
        }
        prep
    }
}

/// Full configuration for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub datasets: Vec<DatasetSource>,
    pub specs: Vec<RegressionSpec>,
    pub prep: PrepConfig,
    /// Fit pairs on the rayon pool. Output order is unchanged.
    pub parallel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            datasets: Vec::new(),
            specs: default_specs(),
            prep: PrepConfig::default(),
            parallel: false,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.prep.validate()?;
        if self.specs.is_empty() {
            return Err(AppError::new(2, "No regression specs configured."));
        }
        let mut seen = HashSet::new();
        for spec in &self.specs {
            if !seen.insert(spec.id.as_str()) {
                return Err(AppError::new(2, format!("Duplicate spec id `{}`.", spec.id)));
            }
            if spec.independent.is_empty() {
                return Err(AppError::new(
                    2,
                    format!("Spec `{}` has no independent variables.", spec.id),
                ));
            }
        }
        Ok(())
    }
}

/// The two models of the MoU study: log trade value and producer prices on the
/// same regressor set.
pub fn default_specs() -> Vec<RegressionSpec> {
    vec![
        RegressionSpec::new("Regression 1", DEFAULT_LOG_COLUMN, &DEFAULT_REGRESSORS),
        RegressionSpec::new("Regression 2", "Producer Prices", &DEFAULT_REGRESSORS),
    ]
}
