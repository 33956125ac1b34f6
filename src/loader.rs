// src/loader.rs

use crate::error::{PcaError, Result};
use crate::table::RawTable;
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Loads a comma-separated file without a header row.
///
/// Cells are trimmed but not interpreted; turning them into numbers is the
/// job of [`crate::table::validate`].
///
/// # Errors
/// Returns `PcaError::Load` if the file cannot be opened, is malformed, has
/// rows of different lengths, or contains no rows at all.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let file = File::open(path).map_err(|e| PcaError::Load {
        source_name: source_name.clone(),
        reason: e.to_string(),
    })?;
    let table = read_records(file, &source_name)?;
    info!(
        "Loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        source_name
    );
    Ok(table)
}

/// Same as [`load_csv`] for data that is already in memory or on a stream.
pub fn load_csv_from_reader<R: Read>(reader: R) -> Result<RawTable> {
    read_records(reader, "<reader>")
}

fn read_records<R: Read>(reader: R, source_name: &str) -> Result<RawTable> {
    let load_error = |reason: String| PcaError::Load {
        source_name: source_name.to_string(),
        reason,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        // The reader rejects ragged rows itself (UnequalLengths).
        let record = record.map_err(|e| load_error(format!("row {}: {}", i, e)))?;
        if record.len() == 1 && record.get(0).map_or(false, str::is_empty) {
            debug!("Skipping blank line at row {}", i);
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Err(load_error("file contains no data rows".into()));
    }
    RawTable::from_rows(rows).map_err(load_error)
}
