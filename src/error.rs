//! Error types.
//!
//! Two layers:
//!
//! - [`RegressionError`]: typed failures raised by data preparation, design
//!   matrix construction and estimation. The regression runner turns these into
//!   recorded outcomes instead of letting them abort a batch.
//! - [`AppError`]: application-level failure (I/O, config, CLI input) carrying
//!   the process exit code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised by the estimation core for a single dataset or (dataset, spec) pair.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegressionError {
    /// A configured column is absent from the dataset schema.
    #[error("missing column `{column}` in dataset schema")]
    Schema { column: String },

    /// Not enough usable rows for the number of design columns.
    #[error("insufficient observations: n={n} rows for k={k} columns (need n > k)")]
    InsufficientObservations { n: usize, k: usize },

    /// Design columns are (numerically) linearly dependent.
    #[error("singular design matrix for spec `{spec}`: regressors are collinear (rank {rank} < {k})")]
    SingularDesignMatrix { spec: String, rank: usize, k: usize },

    /// Numerical failure during estimation.
    #[error("fit failure: {reason}")]
    FitFailure { reason: String },
}

impl RegressionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegressionError::Schema { .. } => ErrorKind::Schema,
            RegressionError::InsufficientObservations { .. } => ErrorKind::InsufficientObservations,
            RegressionError::SingularDesignMatrix { .. } => ErrorKind::SingularDesignMatrix,
            RegressionError::FitFailure { .. } => ErrorKind::FitFailure,
        }
    }

    pub(crate) fn fit_failure(reason: impl Into<String>) -> Self {
        RegressionError::FitFailure { reason: reason.into() }
    }
}

/// Serializable tag for [`RegressionError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Schema,
    InsufficientObservations,
    SingularDesignMatrix,
    FitFailure,
}

impl ErrorKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ErrorKind::Schema => "SchemaError",
            ErrorKind::InsufficientObservations => "InsufficientObservationsError",
            ErrorKind::SingularDesignMatrix => "SingularDesignMatrixError",
            ErrorKind::FitFailure => "FitFailure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<RegressionError> for AppError {
    fn from(err: RegressionError) -> Self {
        let code = match err.kind() {
            ErrorKind::Schema => 2,
            ErrorKind::InsufficientObservations => 3,
            ErrorKind::SingularDesignMatrix | ErrorKind::FitFailure => 4,
        };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_error_maps_to_kind_and_exit_code() {
        let err = RegressionError::Schema {
            column: "GPR_importer".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains("GPR_importer"));

        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 2);
    }
}
