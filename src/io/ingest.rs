//! CSV and spreadsheet ingest and normalization.
//!
//! This module is responsible for turning a body-composition export into a clean
//! list of `(date, total mass, fat fraction)` measurements that are safe to feed
//! into the trend pipeline.
//!
//! Design goals:
//! - **Lenient header detection** (scale apps name their columns very differently)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no trend logic here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{DatasetStats, RawObservation};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized measurements + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: Vec<RawObservation>,
    /// `None` when no row survived validation.
    pub stats: Option<DatasetStats>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    date: usize,
    weight: usize,
    fat: usize,
}

/// Spreadsheet extensions routed to the workbook reader.
const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "ods"];

/// Day zero of spreadsheet serial dates (serial 1 is 1899-12-31).
const SERIAL_DATE_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Whether `path` names a workbook rather than a CSV.
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SPREADSHEET_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}

/// Load and normalize a CSV file or the first sheet of a workbook.
pub fn load_observations(path: &Path) -> Result<IngestedData, AppError> {
    let data = if is_spreadsheet(path) {
        read_spreadsheet_observations(path)?
    } else {
        let file = File::open(path)
            .map_err(|e| AppError::invalid_input(format!("Failed to open CSV '{}': {e}", path.display())))?;
        read_observations(file)?
    };
    info!(
        path = %path.display(),
        rows = data.rows_read,
        used = data.observations.len(),
        skipped = data.row_errors.len(),
        "ingested measurements"
    );
    Ok(data)
}

/// Parse measurements from any CSV source.
pub fn read_observations<R: Read>(source: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let records = reader
        .records()
        .map(|result| result.map_err(|e| format!("CSV parse error: {e}")));
    Ok(collect_rows(records, columns))
}

/// Parse measurements from the first worksheet of a workbook.
///
/// The first row is the header row. Numeric cells in the date column are
/// serial day numbers; text cells go through [`parse_date`].
pub fn read_spreadsheet_observations(path: &Path) -> Result<IngestedData, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to open spreadsheet '{}': {e}", path.display())))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::invalid_input(format!("Spreadsheet '{}' has no worksheets.", path.display())))?
        .map_err(|e| AppError::invalid_input(format!("Failed to read spreadsheet '{}': {e}", path.display())))?;
    debug!(rows = range.height(), cols = range.width(), "read first worksheet");
    read_sheet_rows(range.rows())
}

fn read_sheet_rows<'a, I>(rows: I) -> Result<IngestedData, AppError>
where
    I: IntoIterator<Item = &'a [Data]>,
{
    let mut rows = rows.into_iter();
    let headers: StringRecord = rows
        .next()
        .ok_or_else(|| AppError::invalid_input("Spreadsheet is empty."))?
        .iter()
        .map(|cell| cell_text(cell, false))
        .collect();
    let columns = resolve_columns(&headers)?;

    let records = rows.map(|row| {
        let record: StringRecord = row
            .iter()
            .enumerate()
            .map(|(idx, cell)| cell_text(cell, idx == columns.date))
            .collect();
        Ok::<_, String>(record)
    });
    Ok(collect_rows(records, columns))
}

fn collect_rows<I>(records: I, columns: Columns) -> IngestedData
where
    I: Iterator<Item = Result<StringRecord, String>>,
{
    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in records.enumerate() {
        // Header is line 1, records start at line 2.
        let line = idx + 2;
        rows_read += 1;

        match result.and_then(|record| parse_row(&record, columns)) {
            Ok(obs) => observations.push(obs),
            Err(message) => {
                debug!(line, %message, "skipping row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    let stats = compute_stats(&observations);
    IngestedData {
        observations,
        stats,
        row_errors,
        rows_read,
    }
}

/// Render a cell as the text the CSV path would have seen.
fn cell_text(cell: &Data, date_column: bool) -> String {
    let serial = match cell {
        Data::Float(v) => Some(*v),
        Data::Int(v) => Some(*v as f64),
        Data::DateTime(dt) => Some(dt.as_f64()),
        _ => None,
    };
    match serial {
        Some(v) if date_column => serial_to_date(v)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| v.to_string()),
        Some(v) => v.to_string(),
        None => match cell {
            Data::Empty => String::new(),
            other => other.to_string(),
        },
    }
}

/// Convert a spreadsheet serial number to its calendar day; the time of day is dropped.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let (y, m, d) = SERIAL_DATE_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(serial.floor() as u64))
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns, AppError> {
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let find = |pred: &dyn Fn(&str) -> bool| names.iter().position(|h| pred(h));

    let date = find(&|h| h.contains("date") || h.contains("日時"));
    let weight = find(&|h| h.contains("weight"));
    let fat = find(&|h| h.contains("fat"));

    match (date, weight, fat) {
        (Some(date), Some(weight), Some(fat)) => Ok(Columns { date, weight, fat }),
        _ => Err(AppError::invalid_input(
            "Header row must contain columns matching \"date\", \"weight\", and \"fat\".",
        )),
    }
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Quotes survive when a tool double-quotes already-quoted names.
    let name = name.trim().trim_start_matches('\u{feff}').replace('"', "");
    name.trim().to_lowercase()
}

fn parse_row(record: &StringRecord, columns: Columns) -> Result<RawObservation, String> {
    let date_raw = get_required(record, columns.date, "date")?;
    let date = parse_date(date_raw)?;
    let total_mass = parse_f64(get_required(record, columns.weight, "weight")?, "weight")?;
    let fat_fraction = parse_f64(get_required(record, columns.fat, "fat")?, "fat")?;

    if total_mass <= 0.0 {
        return Err(format!("Invalid weight {total_mass} (must be > 0)."));
    }
    if !(fat_fraction > 0.0 && fat_fraction <= 100.0) {
        return Err(format!("Invalid fat percentage {fat_fraction} (must be in (0, 100])."));
    }

    Ok(RawObservation::new(date, total_mass, fat_fraction))
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(|s| s.trim().trim_matches('"'))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{s}' in `{name}`."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value in `{name}`."))
    }
}

/// Parse a calendar day, keeping only the date part of timestamps.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const DATE_FMTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    const DATETIME_FMTS: [&str; 6] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    Err(format!(
        "Invalid date '{s}'. Expected YYYY-MM-DD (optionally with a time) or YYYY/MM/DD."
    ))
}

fn compute_stats(observations: &[RawObservation]) -> Option<DatasetStats> {
    let first_date = observations.iter().map(|o| o.date).min()?;
    let last_date = observations.iter().map(|o| o.date).max()?;
    let total_mass_min = observations.iter().map(|o| o.total_mass).fold(f64::INFINITY, f64::min);
    let total_mass_max = observations
        .iter()
        .map(|o| o.total_mass)
        .fold(f64::NEG_INFINITY, f64::max);

    Some(DatasetStats {
        n_observations: observations.len(),
        first_date,
        last_date,
        total_mass_min,
        total_mass_max,
    })
}
