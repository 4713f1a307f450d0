//! CSV ingest.
//!
//! Turns a panel exported from a spreadsheet (one header row, one row per
//! observation) into a [`Dataset`]. Every cell is coerced to a number; blanks
//! and the usual spreadsheet NA markers become missing values, as does anything
//! else that does not parse.
//!
//! Design goals:
//! - **Strict header**: duplicate or empty column names are an error (exit code 2)
//! - **Lenient cells**: bad cells become missing and are left to data preparation
//! - **No fitting logic here**

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::debug;

use crate::domain::{Dataset, DatasetSource, Value};
use crate::error::AppError;

/// Cell spellings that load as missing.
const NA_MARKERS: [&str; 8] = ["", "na", "n/a", "#n/a", "nan", "null", "none", "-"];

/// Load the CSV named by `source` into a dataset.
pub fn load_dataset(source: &DatasetSource) -> Result<Dataset, AppError> {
    let file = File::open(&source.path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open CSV '{}': {e}", source.path.display()),
        )
    })?;
    read_dataset(file, &source.dataset_id())
}

/// Read a dataset from any CSV source.
pub fn read_dataset<R: Read>(input: R, id: &str) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Dataset '{id}': failed to read CSV headers: {e}")))?
        .clone();
    let columns = header_names(&headers, id)?;

    let mut rows = Vec::new();
    let mut unparsed = 0usize;
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(2, format!("Dataset '{id}': CSV parse error on line {line}: {e}")))?;

        let mut row: Vec<Value> = Vec::with_capacity(columns.len());
        for col in 0..columns.len() {
            let raw = record.get(col).unwrap_or("");
            let value = parse_cell(raw);
            if value.is_none() && !is_na_marker(raw) {
                unparsed += 1;
                debug!("dataset '{id}': line {line}, column `{}`: non-numeric cell {raw:?} loaded as missing", columns[col]);
            }
            row.push(value);
        }
        rows.push(row);
    }

    if unparsed > 0 {
        debug!("dataset '{id}': {unparsed} non-numeric cell(s) loaded as missing");
    }
    Dataset::new(id, columns, rows)
}

fn header_names(headers: &StringRecord, id: &str) -> Result<Vec<String>, AppError> {
    let mut out = Vec::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let name = normalize_header_name(name);
        if name.is_empty() {
            return Err(AppError::new(
                2,
                format!("Dataset '{id}': column {} has an empty header.", idx + 1),
            ));
        }
        out.push(name);
    }
    Ok(out)
}

fn normalize_header_name(name: &str) -> String {
    // Excel writes UTF-8 CSVs with a BOM on the first header. Column names are
    // otherwise kept verbatim: `GPR_world` and `gpr_world` are different columns.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn is_na_marker(raw: &str) -> bool {
    let raw = raw.trim();
    NA_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m))
}

fn parse_cell(raw: &str) -> Value {
    let raw = raw.trim();
    if is_na_marker(raw) {
        return None;
    }
    let parsed = if raw.contains(',') {
        strip_grouping(raw)?.parse::<f64>()
    } else {
        raw.parse::<f64>()
    };
    match parsed {
        Ok(v) if v.is_nan() => None,
        Ok(v) => Some(v),
        Err(_) => None,
    }
}

/// Drop thousands separators (`1,250,000.5` -> `1250000.5`).
///
/// Commas are only accepted between three-digit groups of the integer part;
/// anything else (a decimal comma such as `1,5`, `12,34`) rejects the cell.
fn strip_grouping(raw: &str) -> Option<String> {
    let unsigned = raw.trim_start_matches(['+', '-']);
    let int_part = unsigned.split(['.', 'e', 'E']).next().unwrap_or("");
    if unsigned[int_part.len()..].contains(',') {
        return None;
    }

    let mut groups = int_part.split(',');
    let lead = groups.next().unwrap_or("");
    let digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    if lead.is_empty() || lead.len() > 3 || !digits(lead) {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && digits(g)) {
        return None;
    }
    Some(raw.replace(',', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_verbatim_and_maps_na_to_missing() {
        let csv = "\u{feff}Trade Value,Import Share,GPR_world\n\
                   \"1,250.5\",0.25,NA\n\
                   ,0.5,101.2\n\
                   -3,#N/A,abc\n";
        let ds = read_dataset(csv.as_bytes(), "mangoes").unwrap();

        assert_eq!(ds.id(), "mangoes");
        assert_eq!(ds.columns(), &["Trade Value", "Import Share", "GPR_world"]);
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.column("Trade Value").unwrap(), vec![Some(1250.5), None, Some(-3.0)]);
        assert_eq!(ds.column("Import Share").unwrap(), vec![Some(0.25), Some(0.5), None]);
        assert_eq!(ds.column("GPR_world").unwrap(), vec![None, Some(101.2), None]);
    }

    #[test]
    fn only_well_formed_thousands_separators_are_stripped() {
        assert_eq!(parse_cell("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_cell("-2,500.25"), Some(-2500.25));
        assert_eq!(parse_cell("999"), Some(999.0));

        // Decimal commas and misplaced separators are not guessed at.
        assert_eq!(parse_cell("1,5"), None);
        assert_eq!(parse_cell("12,34,567"), None);
        assert_eq!(parse_cell("1234,567"), None);
        assert_eq!(parse_cell(",500"), None);
        assert_eq!(parse_cell("1.250,5"), None);
    }

    #[test]
    fn decimal_comma_cell_loads_as_missing() {
        let csv = "Trade Value,Import Share\n\"1,5\",0.25\n";
        let ds = read_dataset(csv.as_bytes(), "d").unwrap();
        assert_eq!(ds.column("Trade Value").unwrap(), vec![None]);
        assert_eq!(ds.column("Import Share").unwrap(), vec![Some(0.25)]);
    }

    #[test]
    fn short_rows_are_padded_with_missing() {
        let csv = "a,b,c\n1,2\n";
        let ds = read_dataset(csv.as_bytes(), "d").unwrap();
        assert_eq!(ds.rows()[0], vec![Some(1.0), Some(2.0), None]);
    }

    #[test]
    fn duplicate_or_empty_headers_are_rejected() {
        let err = read_dataset("a,a\n1,2\n".as_bytes(), "d").unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = read_dataset("a,,c\n1,2,3\n".as_bytes(), "d").unwrap_err();
        assert!(err.to_string().contains("empty header"));
    }

    #[test]
    fn missing_file_is_input_error() {
        let source = DatasetSource::from_path("does/not/exist.csv");
        let err = load_dataset(&source).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
