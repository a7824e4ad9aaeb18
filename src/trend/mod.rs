//! Trend pipeline orchestration.
//!
//! Responsibilities:
//!
//! - densify measurements onto a calendar day grid
//! - fill gaps with a monotone spline
//! - flag outliers, run the constrained filter, and smooth with two EMAs

pub mod calendar;
pub mod ema;
pub mod hampel;
pub mod interpolate;
pub mod kalman;
pub mod pipeline;

pub use pipeline::*;
