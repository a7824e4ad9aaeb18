//! Data sources other than user CSV files.

pub mod sample;

pub use sample::*;
