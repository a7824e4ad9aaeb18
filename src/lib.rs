//! `bodycomp-trend` library crate.
//!
//! The binary (`bct`) is a thin wrapper around this library so that:
//!
//! - the trend pipeline is testable without spawning processes
//! - the CLI and the TUI share one implementation of every stage
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod trend;
pub mod tui;
