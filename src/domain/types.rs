//! Shared domain types.
//!
//! These types are kept lightweight and (where it matters) serializable so they can be:
//!
//! - built by the loader and consumed by the estimation core
//! - exported to JSON/CSV
//! - rendered by the text report

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind, RegressionError};

/// One cell: a numeric value or missing.
pub type Value = Option<f64>;

/// Name given to the intercept column of every design matrix.
pub const INTERCEPT_NAME: &str = "const";

/// An ordered set of observation rows over a fixed set of named columns.
///
/// The column set is fixed at construction. Transformations return a new
/// dataset; nothing mutates a dataset in place once it has been handed out.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    id: String,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Build a dataset, validating that column names are unique and every row
    /// has one cell per column.
    pub fn new(id: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, AppError> {
        let id = id.into();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(AppError::new(2, format!("Dataset '{id}': duplicate column `{name}`.")));
            }
        }
        for (r, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(AppError::new(
                    2,
                    format!(
                        "Dataset '{id}': row {r} has {} cells, expected {}.",
                        row.len(),
                        columns.len()
                    ),
                ));
            }
        }
        Ok(Self { id, columns, index, rows })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Column position, or a schema error naming the missing column.
    pub fn require_column(&self, name: &str) -> Result<usize, RegressionError> {
        self.column_index(name).ok_or_else(|| RegressionError::Schema {
            column: name.to_string(),
        })
    }

    /// Copy of one column's cells, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<Value>, RegressionError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Keep only the rows for which `keep` returns true, preserving order.
    pub(crate) fn retain_rows<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(&[Value]) -> bool,
    {
        Dataset {
            id: self.id.clone(),
            columns: self.columns.clone(),
            index: self.index.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// Replace (or append) a column. `values` must have one entry per row.
    pub(crate) fn with_column(mut self, name: &str, values: Vec<Value>) -> Dataset {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.index.get(name).copied() {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                let idx = self.columns.len();
                self.columns.push(name.to_string());
                self.index.insert(name.to_string(), idx);
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        self
    }
}

/// One linear model to fit: dependent variable, ordered regressors and any
/// extra columns that must be present for a row to be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionSpec {
    pub id: String,
    pub dependent: String,
    pub independent: Vec<String>,
    #[serde(default)]
    pub required_columns: Vec<String>,
}

impl RegressionSpec {
    pub fn new(id: impl Into<String>, dependent: impl Into<String>, independent: &[&str]) -> Self {
        Self {
            id: id.into(),
            dependent: dependent.into(),
            independent: independent.iter().map(|s| s.to_string()).collect(),
            required_columns: Vec::new(),
        }
    }

    /// Names of the design columns: intercept first, then regressors.
    pub fn design_names(&self) -> Vec<String> {
        std::iter::once(INTERCEPT_NAME.to_string())
            .chain(self.independent.iter().cloned())
            .collect()
    }
}

/// Estimates for one coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRow {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_stat: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// Output of a single OLS fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub t_stats: Vec<f64>,
    pub p_values: Vec<f64>,
    /// 95% confidence interval bounds per coefficient.
    pub conf_int: Vec<(f64, f64)>,
    pub nobs: usize,
    pub df_model: usize,
    pub df_resid: usize,
    pub rss: f64,
    pub tss: f64,
    pub sigma2: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub residuals: Vec<f64>,
}

impl RegressionResult {
    /// Per-coefficient view, in design column order.
    pub fn coefficient_rows(&self) -> Vec<CoefficientRow> {
        (0..self.coefficients.len())
            .map(|i| CoefficientRow {
                name: self.names.get(i).cloned().unwrap_or_else(|| format!("x{i}")),
                estimate: self.coefficients[i],
                std_error: self.std_errors[i],
                t_stat: self.t_stats[i],
                p_value: self.p_values[i],
                ci_lower: self.conf_int[i].0,
                ci_upper: self.conf_int[i].1,
            })
            .collect()
    }
}

/// Counts describing what data preparation did to a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrepSummary {
    pub rows_read: usize,
    pub rows_used: usize,
    /// Number of trade values replaced by the positive floor.
    pub floored: usize,
}

/// Result of one (dataset, spec) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegressionOutcome {
    Success {
        dataset: String,
        spec: String,
        prep: PrepSummary,
        result: RegressionResult,
    },
    Failure(OutcomeFailure),
}

/// Structured description of a failed pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeFailure {
    pub dataset: String,
    pub spec: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl OutcomeFailure {
    pub fn from_error(dataset: &str, spec: &str, err: &RegressionError) -> Self {
        Self {
            dataset: dataset.to_string(),
            spec: spec.to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl RegressionOutcome {
    pub fn dataset(&self) -> &str {
        match self {
            RegressionOutcome::Success { dataset, .. } => dataset,
            RegressionOutcome::Failure(f) => &f.dataset,
        }
    }

    pub fn spec(&self) -> &str {
        match self {
            RegressionOutcome::Success { spec, .. } => spec,
            RegressionOutcome::Failure(f) => &f.spec,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RegressionOutcome::Success { .. })
    }

    pub fn result(&self) -> Option<&RegressionResult> {
        match self {
            RegressionOutcome::Success { result, .. } => Some(result),
            RegressionOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&OutcomeFailure> {
        match self {
            RegressionOutcome::Success { .. } => None,
            RegressionOutcome::Failure(f) => Some(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dataset_rejects_ragged_rows_and_duplicate_columns() {
        let err = Dataset::new("d", cols(&["a", "b"]), vec![vec![Some(1.0)]]).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = Dataset::new("d", cols(&["a", "a"]), vec![]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn with_column_appends_and_replaces_without_touching_original() {
        let ds = Dataset::new("d", cols(&["a"]), vec![vec![Some(1.0)], vec![None]]).unwrap();
        let derived = ds.clone().with_column("b", vec![Some(2.0), Some(3.0)]);
        assert_eq!(derived.columns(), &cols(&["a", "b"])[..]);
        assert_eq!(derived.column("b").unwrap(), vec![Some(2.0), Some(3.0)]);
        assert!(!ds.has_column("b"));

        let replaced = derived.with_column("a", vec![Some(9.0), Some(9.0)]);
        assert_eq!(replaced.column("a").unwrap(), vec![Some(9.0), Some(9.0)]);
        assert_eq!(replaced.columns().len(), 2);
    }

    #[test]
    fn missing_column_is_schema_error() {
        let ds = Dataset::new("d", cols(&["a"]), vec![]).unwrap();
        let err = ds.column("Import Share").unwrap_err();
        assert_eq!(
            err,
            RegressionError::Schema {
                column: "Import Share".to_string()
            }
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = RegressionOutcome::Failure(OutcomeFailure {
            dataset: "d".to_string(),
            spec: "s".to_string(),
            kind: ErrorKind::SingularDesignMatrix,
            message: "boom".to_string(),
        });
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"failure\""));
        assert!(json.contains("\"kind\":\"singular_design_matrix\""));
    }
}
