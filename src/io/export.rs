//! Export regression outcomes.
//!
//! - JSON: the full outcome list, including failures, for downstream scripts
//! - CSV: a tidy coefficient table (one row per coefficient, failures as a
//!   single row with the error), easy to open in a spreadsheet

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::RegressionOutcome;
use crate::error::AppError;

#[derive(Serialize)]
struct OutcomeFile<'a> {
    tool: &'static str,
    generated: String,
    outcomes: &'a [RegressionOutcome],
}

/// Write all outcomes to a JSON file.
pub fn write_outcomes_json(path: &Path, outcomes: &[RegressionOutcome]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let doc = OutcomeFile {
        tool: "tols",
        generated: chrono::Local::now().to_rfc3339(),
        outcomes,
    };
    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

/// Write a tidy coefficient table to a CSV file.
pub fn write_coefficients_csv(path: &Path, outcomes: &[RegressionOutcome]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_coefficients(file, outcomes)
}

/// Write the coefficient table to any writer.
pub fn write_coefficients<W: Write>(out: W, outcomes: &[RegressionOutcome]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    let map_err = |e: csv::Error| AppError::new(2, format!("Failed to write export CSV row: {e}"));

    writer
        .write_record([
            "dataset", "spec", "status", "term", "coef", "std_err", "t", "p_value", "ci_lower", "ci_upper", "nobs",
            "df_resid", "r_squared", "adj_r_squared", "f_statistic", "f_p_value", "error",
        ])
        .map_err(map_err)?;

    for outcome in outcomes {
        match outcome {
            RegressionOutcome::Success { dataset, spec, result, .. } => {
                for row in result.coefficient_rows() {
                    writer
                        .write_record([
                            dataset.clone(),
                            spec.clone(),
                            "success".to_string(),
                            row.name,
                            fmt_num(row.estimate),
                            fmt_num(row.std_error),
                            fmt_num(row.t_stat),
                            fmt_num(row.p_value),
                            fmt_num(row.ci_lower),
                            fmt_num(row.ci_upper),
                            result.nobs.to_string(),
                            result.df_resid.to_string(),
                            fmt_num(result.r_squared),
                            fmt_num(result.adj_r_squared),
                            fmt_num(result.f_statistic),
                            fmt_num(result.f_p_value),
                            String::new(),
                        ])
                        .map_err(map_err)?;
                }
            }
            RegressionOutcome::Failure(f) => {
                let mut record = vec![f.dataset.clone(), f.spec.clone(), f.kind.display_name().to_string()];
                record.extend(std::iter::repeat_n(String::new(), 13));
                record.push(f.message.clone());
                writer.write_record(&record).map_err(map_err)?;
            }
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn fmt_num(v: f64) -> String {
    if v.is_finite() { format!("{v:.10}") } else { v.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OutcomeFailure, PrepSummary, RegressionResult};
    use crate::error::ErrorKind;

    fn result() -> RegressionResult {
        RegressionResult {
            names: vec!["const".into(), "Import Share".into()],
            coefficients: vec![0.6, 0.8],
            std_errors: vec![1.1, 0.35],
            t_stats: vec![0.5, 2.3],
            p_values: vec![0.6, 0.1],
            conf_int: vec![(-3.0, 4.0), (-0.3, 1.9)],
            nobs: 5,
            df_model: 1,
            df_resid: 3,
            rss: 3.6,
            tss: 10.0,
            sigma2: 1.2,
            r_squared: 0.64,
            adj_r_squared: 0.52,
            f_statistic: 5.33,
            f_p_value: 0.1,
            log_likelihood: -6.27,
            aic: 16.5,
            bic: 15.8,
            residuals: vec![-0.4, 0.8, -1.0, 1.2, -0.6],
        }
    }

    #[test]
    fn coefficient_csv_has_one_row_per_term_and_one_per_failure() {
        let outcomes = vec![
            RegressionOutcome::Success {
                dataset: "d".into(),
                spec: "Regression 1".into(),
                prep: PrepSummary::default(),
                result: result(),
            },
            RegressionOutcome::Failure(OutcomeFailure {
                dataset: "d".into(),
                spec: "Regression 2".into(),
                kind: ErrorKind::SingularDesignMatrix,
                message: "collinear".into(),
            }),
        ];
        let mut buf = Vec::new();
        write_coefficients(&mut buf, &outcomes).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("d,Regression 1,success,const,0.6000000000"));
        assert!(lines[2].contains("Import Share"));
        assert!(lines[3].starts_with("d,Regression 2,SingularDesignMatrixError,"));
        assert!(lines[3].ends_with(",collinear"));
        assert_eq!(lines[3].split(',').count(), 17);
    }
}
