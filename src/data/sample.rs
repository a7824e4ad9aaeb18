//! Seeded synthetic body-composition measurements.
//!
//! The generator walks a latent weight and body-fat percentage day by day, then
//! "measures" it with scale noise. Some days are skipped and a few readings get a
//! large spike so the outlier stage has something to do.

use std::path::Path;

use chrono::{Days, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::Serialize;
use tracing::info;

use crate::domain::RawObservation;
use crate::error::AppError;
use crate::math::round_to;

/// Fat-percentage jump applied to a spiked reading.
const SPIKE_FAT_PCT: f64 = 4.0;

/// Generator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub days: usize,
    pub seed: u64,
    pub start: NaiveDate,
    pub start_weight: f64,
    pub start_fat_pct: f64,
    /// Probability that a day has no measurement.
    pub gap_prob: f64,
    /// Probability that a measured day carries a spike.
    pub spike_prob: f64,
}

impl SampleConfig {
    pub fn new(days: usize, seed: u64, start: NaiveDate) -> Self {
        Self {
            days,
            seed,
            start,
            start_weight: 78.0,
            start_fat_pct: 24.0,
            gap_prob: 0.35,
            spike_prob: 0.03,
        }
    }
}

#[derive(Debug, Serialize)]
struct SampleRow {
    date: NaiveDate,
    weight_kg: f64,
    body_fat_pct: f64,
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<RawObservation>, AppError> {
    if config.days < 2 {
        return Err(AppError::invalid_input("Sample needs at least 2 days."));
    }
    if !(0.0..1.0).contains(&config.gap_prob) || !(0.0..1.0).contains(&config.spike_prob) {
        return Err(AppError::invalid_input("Invalid gap/spike probability settings."));
    }
    if !(config.start_weight > 0.0 && config.start_fat_pct > 0.0 && config.start_fat_pct < 100.0) {
        return Err(AppError::invalid_input("Invalid starting weight or fat percentage."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let drift_weight = Normal::new(-0.02, 0.08)
        .map_err(|e| AppError::internal(format!("Noise distribution error: {e}")))?;
    let drift_fat = Normal::new(-0.01, 0.05)
        .map_err(|e| AppError::internal(format!("Noise distribution error: {e}")))?;
    let scale_weight = Normal::new(0.0, 0.3)
        .map_err(|e| AppError::internal(format!("Noise distribution error: {e}")))?;
    let scale_fat = Normal::new(0.0, 0.6)
        .map_err(|e| AppError::internal(format!("Noise distribution error: {e}")))?;

    let mut weight = config.start_weight;
    let mut fat_pct = config.start_fat_pct;
    let mut out = Vec::with_capacity(config.days);
    let mut spikes = 0usize;

    for day in 0..config.days {
        weight = (weight + drift_weight.sample(&mut rng)).max(30.0);
        fat_pct = (fat_pct + drift_fat.sample(&mut rng)).clamp(3.0, 60.0);

        // First and last day are always measured so the span is exactly `days`.
        let edge = day == 0 || day + 1 == config.days;
        if !edge && rng.gen_bool(config.gap_prob) {
            continue;
        }

        let mut measured_fat = fat_pct + scale_fat.sample(&mut rng);
        if !edge && rng.gen_bool(config.spike_prob) {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            measured_fat += sign * SPIKE_FAT_PCT;
            spikes += 1;
        }
        let measured_weight = weight + scale_weight.sample(&mut rng);

        let date = config
            .start
            .checked_add_days(Days::new(day as u64))
            .ok_or_else(|| AppError::invalid_input("Sample dates overflow the calendar."))?;
        out.push(RawObservation::new(
            date,
            round_to(measured_weight, 1),
            round_to(measured_fat.clamp(1.0, 99.0), 1),
        ));
    }

    info!(days = config.days, measured = out.len(), spikes, seed = config.seed, "generated sample");
    Ok(out)
}

/// Write observations as a CSV that `io::ingest` reads back.
pub fn write_sample_csv(path: &Path, observations: &[RawObservation]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    for obs in observations {
        writer
            .serialize(SampleRow {
                date: obs.date,
                weight_kg: obs.total_mass,
                body_fat_pct: obs.fat_fraction,
            })
            .map_err(|e| AppError::invalid_input(format!("Failed to write sample CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::invalid_input(format!("Failed to flush sample CSV: {e}")))?;
    info!(path = %path.display(), rows = observations.len(), "wrote sample CSV");
    Ok(())
}
