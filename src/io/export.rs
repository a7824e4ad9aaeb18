//! Export the daily series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per day, columns named after `OutputRecord` fields, empty cells on days
//! without a measurement.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::OutputRecord;
use crate::error::AppError;

/// Write daily records to a CSV file.
pub fn write_records_csv(path: &Path, records: &[OutputRecord]) -> Result<(), AppError> {
    let writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_records(writer, records)?;
    info!(path = %path.display(), rows = records.len(), "wrote series CSV");
    Ok(())
}

/// Write daily records to any CSV sink.
pub fn write_records<W: Write>(mut writer: csv::Writer<W>, records: &[OutputRecord]) -> Result<(), AppError> {
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| AppError::invalid_input(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::invalid_input(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
