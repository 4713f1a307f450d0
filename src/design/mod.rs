//! Design matrix construction and well-posedness checks.
//!
//! Column order is fixed: intercept (`const`, all ones) first, then the
//! regressors in the order `RegressionSpec::independent` lists them. Rows
//! follow the prepared dataset 1:1.
//!
//! Rejected up front, before any estimation:
//! - columns missing from the schema
//! - `n <= k` (no residual degrees of freedom)
//! - missing or non-finite cells in a model column
//! - rank-deficient designs (collinear regressors)

use nalgebra::{DMatrix, DVector};

use crate::domain::{Dataset, RegressionSpec};
use crate::error::RegressionError;
use crate::math::numerical_rank;

/// Regressor matrix `x` (n × k) and response `y` (n), with column names.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub names: Vec<String>,
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
}

impl DesignMatrix {
    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }
}

/// Build and validate the design matrix for `spec` over a prepared dataset.
pub fn build_design(dataset: &Dataset, spec: &RegressionSpec) -> Result<DesignMatrix, RegressionError> {
    let y_idx = dataset.require_column(&spec.dependent)?;
    let x_idx: Vec<usize> = spec
        .independent
        .iter()
        .map(|name| dataset.require_column(name))
        .collect::<Result<_, _>>()?;

    let n = dataset.n_rows();
    let k = x_idx.len() + 1;
    if n <= k {
        return Err(RegressionError::InsufficientObservations { n, k });
    }

    let rows = dataset.rows();
    let mut y = DVector::zeros(n);
    let mut x = DMatrix::zeros(n, k);
    for (i, row) in rows.iter().enumerate() {
        y[i] = finite_cell(row[y_idx], &spec.dependent, i)?;
        x[(i, 0)] = 1.0;
        for (j, &idx) in x_idx.iter().enumerate() {
            x[(i, j + 1)] = finite_cell(row[idx], &spec.independent[j], i)?;
        }
    }

    let rank = numerical_rank(&x);
    if rank < k {
        return Err(RegressionError::SingularDesignMatrix {
            spec: spec.id.clone(),
            rank,
            k,
        });
    }

    Ok(DesignMatrix {
        names: spec.design_names(),
        x,
        y,
    })
}

fn finite_cell(v: Option<f64>, column: &str, row: usize) -> Result<f64, RegressionError> {
    match v {
        Some(x) if x.is_finite() => Ok(x),
        Some(x) => Err(RegressionError::fit_failure(format!(
            "non-finite value {x} in column `{column}` at row {row}"
        ))),
        None => Err(RegressionError::fit_failure(format!(
            "missing value in column `{column}` at row {row} (add it to the required columns)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str], rows: Vec<Vec<f64>>) -> Dataset {
        Dataset::new(
            "test",
            columns.iter().map(|s| s.to_string()).collect(),
            rows.into_iter().map(|r| r.into_iter().map(Some).collect()).collect(),
        )
        .unwrap()
    }

    fn rows(n: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                vec![2.0 * t + 1.0, t, (t * 0.7).sin(), (t * 0.3).cos()]
            })
            .collect()
    }

    #[test]
    fn intercept_first_then_spec_order() {
        let ds = dataset(&["y", "a", "b", "c"], rows(10));
        let spec = RegressionSpec::new("s", "y", &["c", "a"]);
        let design = build_design(&ds, &spec).unwrap();

        assert_eq!(design.names, vec!["const", "c", "a"]);
        assert_eq!(design.nrows(), 10);
        assert_eq!(design.ncols(), 3);
        for i in 0..10 {
            assert_eq!(design.x[(i, 0)], 1.0);
            assert_eq!(design.x[(i, 2)], i as f64);
            assert_eq!(design.y[i], 2.0 * i as f64 + 1.0);
        }
    }

    #[test]
    fn identical_columns_are_singular() {
        let ds = dataset(&["y", "a", "b", "c"], rows(20));
        let spec = RegressionSpec::new("dup", "y", &["a", "b", "a"]);
        let err = build_design(&ds, &spec).unwrap_err();
        assert!(matches!(err, RegressionError::SingularDesignMatrix { ref spec, rank: 3, k: 4 } if spec == "dup"));
    }

    #[test]
    fn constant_regressor_is_collinear_with_intercept() {
        let data: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64, 3.0]).collect();
        let ds = dataset(&["y", "k"], data);
        let err = build_design(&ds, &RegressionSpec::new("s", "y", &["k"])).unwrap_err();
        assert!(matches!(err, RegressionError::SingularDesignMatrix { .. }));
    }

    #[test]
    fn nearly_identical_columns_are_singular_not_a_fit_failure() {
        let data: Vec<Vec<f64>> = (0..50)
            .map(|i| {
                let t = i as f64;
                vec![0.5 * t + (0.9 * t).cos(), t, t + 1e-11 * (1.7 * t).sin()]
            })
            .collect();
        let ds = dataset(&["y", "a", "b"], data);
        let err = build_design(&ds, &RegressionSpec::new("near", "y", &["a", "b"])).unwrap_err();
        assert!(matches!(err, RegressionError::SingularDesignMatrix { rank: 2, k: 3, .. }));
    }

    #[test]
    fn too_few_rows_is_insufficient_observations() {
        let ds = dataset(&["y", "a", "b", "c"], rows(4));
        let err = build_design(&ds, &RegressionSpec::new("s", "y", &["a", "b", "c"])).unwrap_err();
        assert_eq!(err, RegressionError::InsufficientObservations { n: 4, k: 4 });
    }

    #[test]
    fn unknown_column_is_schema_error() {
        let ds = dataset(&["y", "a", "b", "c"], rows(10));
        let err = build_design(&ds, &RegressionSpec::new("s", "y", &["a", "PS_importer"])).unwrap_err();
        assert_eq!(
            err,
            RegressionError::Schema {
                column: "PS_importer".to_string()
            }
        );
    }

    #[test]
    fn missing_cell_in_model_column_fails_the_fit() {
        let columns = vec!["y".to_string(), "a".to_string()];
        let mut data: Vec<Vec<Option<f64>>> = (0..6).map(|i| vec![Some(i as f64), Some((i * i) as f64)]).collect();
        data[3][1] = None;
        let ds = Dataset::new("test", columns, data).unwrap();
        let err = build_design(&ds, &RegressionSpec::new("s", "y", &["a"])).unwrap_err();
        assert!(matches!(err, RegressionError::FitFailure { .. }));
    }
}
