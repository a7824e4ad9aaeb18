//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - normalized measurements (`RawObservation`) and channel aliases
//! - pipeline tuning (`TrendConfig`) and the per-day filter decision (`FilterStep`)
//! - outputs (`OutputRecord`, `SeriesFile`) and view selectors (`ChartMode`, `QuickRange`)

pub mod types;

pub use types::*;
