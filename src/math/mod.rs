//! Mathematical utilities: robust statistics and monotone spline interpolation.

pub mod spline;
pub mod stats;

pub use spline::*;
pub use stats::*;
