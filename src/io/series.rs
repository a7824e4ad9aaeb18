//! Read/write series JSON files.
//!
//! Series JSON is the "portable" representation of a processed run:
//! - the trend configuration that produced it
//! - the covered date span
//! - every daily output record
//!
//! The schema is defined by `domain::SeriesFile`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::domain::{DateSpan, OutputRecord, SeriesFile, TrendConfig};
use crate::error::AppError;

/// Tool identifier stamped into every series file.
pub const SERIES_TOOL: &str = "bct";

/// Bundle records and configuration into a series file.
pub fn build_series_file(records: &[OutputRecord], config: &TrendConfig) -> Result<SeriesFile, AppError> {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Err(AppError::invalid_input("Cannot save an empty series."));
    };
    Ok(SeriesFile {
        tool: SERIES_TOOL.to_string(),
        generated_for: DateSpan {
            first_date: first.date,
            last_date: last.date,
        },
        config: *config,
        records: records.to_vec(),
    })
}

/// Write a series JSON file.
pub fn write_series_json(path: &Path, records: &[OutputRecord], config: &TrendConfig) -> Result<(), AppError> {
    let series = build_series_file(records, config)?;
    let file = File::create(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to create series JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &series)
        .map_err(|e| AppError::invalid_input(format!("Failed to write series JSON: {e}")))?;

    info!(path = %path.display(), days = series.records.len(), "wrote series JSON");
    Ok(())
}

/// Read a series JSON file.
pub fn read_series_json(path: &Path) -> Result<SeriesFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to open series JSON '{}': {e}", path.display())))?;
    let series: SeriesFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::invalid_input(format!("Invalid series JSON: {e}")))?;
    if series.records.is_empty() {
        return Err(AppError::invalid_input("Series JSON contains no records."));
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_is_rejected() {
        let err = build_series_file(&[], &TrendConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
