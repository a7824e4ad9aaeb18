//! Shared "trend pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> sufficiency check -> trend analysis -> daily records
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::{info, warn};

use crate::domain::{OutputRecord, RunConfig, TrendConfig};
use crate::error::AppError;
use crate::io::ingest::{IngestedData, load_observations};
use crate::trend::{TrendAnalysis, analyze};

/// Minimum number of usable measurements for a run.
pub const MIN_OBSERVATIONS: usize = 2;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub analysis: TrendAnalysis,
    pub records: Vec<OutputRecord>,
}

/// Reject inputs the pipeline cannot produce a meaningful trend for.
pub fn ensure_sufficient(ingest: &IngestedData) -> Result<(), AppError> {
    if ingest.observations.len() < MIN_OBSERVATIONS {
        return Err(AppError::insufficient_data(
            "Insufficient data: at least 2 valid records are required.",
        ));
    }
    Ok(())
}

/// Load the configured CSV and run the full pipeline.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    config.trend.validate()?;
    let ingest = load_observations(&config.input)?;
    if !ingest.row_errors.is_empty() {
        warn!(skipped = ingest.row_errors.len(), "some rows were skipped");
    }
    run_with_ingest(ingest, &config.trend)
}

/// Run the pipeline over already-ingested data.
///
/// This is useful for the TUI where we want to recompute without re-reading the file.
pub fn run_with_ingest(ingest: IngestedData, trend: &TrendConfig) -> Result<RunOutput, AppError> {
    ensure_sufficient(&ingest)?;
    let analysis = analyze(&ingest.observations, trend)
        .ok_or_else(|| AppError::internal("Trend analysis produced no day grid."))?;
    let records = analysis.records();
    info!(days = records.len(), "built daily series");

    Ok(RunOutput {
        ingest,
        analysis,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::read_observations;

    #[test]
    fn single_usable_row_is_insufficient() {
        let ingest = read_observations("date,weight,fat\n2024-01-01,80,25\n2024-01-02,-1,25\n".as_bytes()).unwrap();
        let err = run_with_ingest(ingest, &TrendConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.message(), "Insufficient data: at least 2 valid records are required.");
    }

    #[test]
    fn two_rows_produce_a_dense_series() {
        let ingest = read_observations("date,weight,fat\n2024-01-01,80,25\n2024-01-03,79,24\n".as_bytes()).unwrap();
        let run = run_with_ingest(ingest, &TrendConfig::default()).unwrap();
        assert_eq!(run.records.len(), 3);
        assert_eq!(run.analysis.grid.len(), 3);
    }
}
