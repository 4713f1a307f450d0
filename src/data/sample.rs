//! Synthetic bilateral trade panel generation.
//!
//! Produces a two-partner annual panel with the same columns as the MoU study
//! inputs, so the full pipeline can be exercised without the study
//! spreadsheets. The generator deliberately injects the two data issues the
//! preparation step exists for: missing cells and non-positive trade values.

use std::io::Write;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DEFAULT_REQUIRED_COLUMNS, Dataset, Value};
use crate::error::AppError;

/// Knobs for [`generate_panel`].
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Observation years per partner country.
    pub years: usize,
    pub first_year: i32,
    /// First year in which the MoU applies.
    pub mou_year: i32,
    pub seed: u64,
    /// Probability that any given regressor cell is blanked.
    pub missing_prob: f64,
    /// Probability that a trade value is recorded as zero or negative.
    pub non_positive_prob: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            years: 24,
            first_year: 2000,
            mou_year: 2012,
            seed: 42,
            missing_prob: 0.02,
            non_positive_prob: 0.03,
        }
    }
}

/// A generated panel plus the coefficients used for the log trade equation.
#[derive(Debug, Clone)]
pub struct SamplePanel {
    pub dataset: Dataset,
    /// `[const, Country, Post MoU, MoU in Effect, Import Share, GPR_importer]`.
    pub true_log_trade_betas: [f64; 6],
}

const TRUE_LOG_TRADE_BETAS: [f64; 6] = [8.0, 0.6, 0.25, 0.4, 1.5, -0.004];
const TRUE_PRICE_BETAS: [f64; 6] = [450.0, -30.0, 15.0, 22.0, -60.0, 0.35];

pub fn generate_panel(id: &str, config: &SampleConfig) -> Result<SamplePanel, AppError> {
    if config.years == 0 {
        return Err(AppError::new(2, "Sample years must be > 0."));
    }
    for (name, p) in [
        ("missing_prob", config.missing_prob),
        ("non_positive_prob", config.non_positive_prob),
    ] {
        if !(0.0..1.0).contains(&p) {
            return Err(AppError::new(2, format!("Invalid {name} {p}: must be in [0, 1).")));
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let std_normal =
        Normal::new(0.0, 1.0).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut columns = vec!["Year".to_string(), "Partner".to_string()];
    columns.extend(DEFAULT_REQUIRED_COLUMNS.iter().map(|s| s.to_string()));

    let gpr_world: Vec<f64> = (0..config.years)
        .map(|_| 100.0 + 15.0 * std_normal.sample(&mut rng))
        .collect();

    let mut rows = Vec::with_capacity(config.years * 2);
    for partner in 0..2u8 {
        let country = f64::from(partner);
        for (t, gpr_w) in gpr_world.iter().enumerate() {
            let year = config.first_year + t as i32;
            let post = if year >= config.mou_year { 1.0 } else { 0.0 };
            let in_effect = country * post;
            let import_share: f64 = rng.gen_range(0.05..0.6);
            let export_share: f64 = rng.gen_range(0.01..0.3);
            let gpr_importer = gpr_w + 10.0 * std_normal.sample(&mut rng);
            let gpr_exporter = gpr_w + 10.0 * std_normal.sample(&mut rng);
            let ps_importer = 0.3 * std_normal.sample(&mut rng);
            let ps_exporter = -0.2 + 0.3 * std_normal.sample(&mut rng);

            let x = [1.0, country, post, in_effect, import_share, gpr_importer];
            let log_trade = dot(&TRUE_LOG_TRADE_BETAS, &x) + 0.15 * std_normal.sample(&mut rng);
            let price = dot(&TRUE_PRICE_BETAS, &x) + 8.0 * std_normal.sample(&mut rng);

            let trade_value = if rng.gen_bool(config.non_positive_prob) {
                if rng.gen_bool(0.5) { 0.0 } else { -log_trade.exp() * 0.01 }
            } else {
                log_trade.exp()
            };

            let mut row: Vec<Value> = vec![
                Some(f64::from(year)),
                Some(country),
                Some(trade_value),
                Some(price),
                Some(country),
                Some(post),
                Some(in_effect),
                Some(export_share),
                Some(*gpr_w),
                Some(gpr_importer),
                Some(gpr_exporter),
                Some(import_share),
                Some(ps_exporter),
                Some(ps_importer),
                Some(in_effect * import_share),
            ];
            // Year/Partner/Trade Value stay intact; blank the rest at random.
            for cell in row.iter_mut().skip(3) {
                if rng.gen_bool(config.missing_prob) {
                    *cell = None;
                }
            }
            rows.push(row);
        }
    }

    let dataset = Dataset::new(id, columns, rows)?;
    Ok(SamplePanel {
        dataset,
        true_log_trade_betas: TRUE_LOG_TRADE_BETAS,
    })
}

/// Write a dataset as CSV (missing cells as empty fields).
pub fn write_dataset_csv<W: Write>(out: W, dataset: &Dataset) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    let map_err = |e: csv::Error| AppError::new(2, format!("Failed to write sample CSV: {e}"));

    writer.write_record(dataset.columns()).map_err(map_err)?;
    for row in dataset.rows() {
        let record: Vec<String> = row
            .iter()
            .map(|v| v.map(|x| x.to_string()).unwrap_or_default())
            .collect();
        writer.write_record(&record).map_err(map_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

fn dot(a: &[f64; 6], b: &[f64; 6]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_dataset;

    #[test]
    fn same_seed_same_panel() {
        let a = generate_panel("p", &SampleConfig::default()).unwrap();
        let b = generate_panel("p", &SampleConfig::default()).unwrap();
        assert_eq!(a.dataset, b.dataset);
        assert_eq!(a.dataset.n_rows(), 48);
        for col in DEFAULT_REQUIRED_COLUMNS {
            assert!(a.dataset.has_column(col), "missing {col}");
        }
    }

    #[test]
    fn injects_non_positive_trade_values_when_asked() {
        let config = SampleConfig {
            non_positive_prob: 0.5,
            ..SampleConfig::default()
        };
        let panel = generate_panel("p", &config).unwrap();
        let tv = panel.dataset.column("Trade Value").unwrap();
        assert!(tv.iter().any(|v| v.is_some_and(|x| x <= 0.0)));
    }

    #[test]
    fn csv_output_reads_back_identically() {
        let panel = generate_panel("p", &SampleConfig::default()).unwrap();
        let mut buf = Vec::new();
        write_dataset_csv(&mut buf, &panel.dataset).unwrap();
        let back = read_dataset(buf.as_slice(), "p").unwrap();
        assert_eq!(back, panel.dataset);
    }

    #[test]
    fn rejects_bad_probabilities() {
        let config = SampleConfig {
            missing_prob: 1.5,
            ..SampleConfig::default()
        };
        assert!(generate_panel("p", &config).is_err());
    }
}
