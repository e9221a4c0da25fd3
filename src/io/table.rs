//! CSV persistence of the wide indicator table.
//!
//! The file is the only contract with the display layer:
//!
//! ```text
//! Country,Country Code,Year,GDP (USD),Inflation (%),Unemployment (%)
//! United States,USA,2020,21060473613000.0,1.23,8.05
//! ```
//!
//! Missing indicator values are written as empty cells.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::StringRecord;

use crate::domain::IndicatorRow;
use crate::error::AppError;
use crate::table::Dataset;

const REQUIRED_COLUMNS: [&str; 3] = ["Country", "Country Code", "Year"];

/// Write the table to a CSV file, replacing any existing file.
pub fn write_table_csv(path: &Path, rows: &[IndicatorRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create table CSV '{}': {e}", path.display())))?;
    write_table(file, rows)
}

/// Write the table as CSV to any writer.
pub fn write_table<W: Write>(writer: W, rows: &[IndicatorRow]) -> Result<(), AppError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        // `serialize` only emits the header with the first record.
        csv_writer
            .write_record(header_names())
            .map_err(|e| AppError::new(2, format!("Failed to write table CSV header: {e}")))?;
    }
    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write table CSV row: {e}")))?;
    }
    csv_writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush table CSV: {e}")))?;
    Ok(())
}

/// Load a persisted table into an immutable `Dataset`.
pub fn read_table_csv(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open table CSV '{}': {e}", path.display())))?;
    read_table(file)
}

/// Read a table from any reader.
///
/// Schema problems fail the whole load; a row with a bad cell does too, since
/// the file is produced by `write_table` and should never contain one.
pub fn read_table<R: Read>(reader: R) -> Result<Dataset, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read table CSV headers: {e}")))?
        .clone();
    let headers = normalize_headers(&headers);
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(AppError::new(2, format!("Missing required column: `{required}`")));
        }
    }
    csv_reader.set_headers(headers);

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.deserialize::<IndicatorRow>().enumerate() {
        // +2: 1-based lines plus the header line.
        let line = idx + 2;
        let row = result.map_err(|e| AppError::new(2, format!("Invalid table CSV row at line {line}: {e}")))?;
        rows.push(row);
    }

    Ok(Dataset::new(rows))
}

fn header_names() -> Vec<&'static str> {
    let mut names = REQUIRED_COLUMNS.to_vec();
    names.extend(crate::domain::Indicator::ALL.iter().map(|i| i.column()));
    names
}

fn normalize_headers(headers: &StringRecord) -> StringRecord {
    // Spreadsheet round-trips sometimes add a BOM to the first header.
    headers
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}'))
        .collect()
}
