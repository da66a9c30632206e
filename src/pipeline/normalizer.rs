// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Series Normalizer
//!
//! Turns a raw activity record into a [`NormalizedSeries`] that every
//! downstream stage can trust: samples sorted by elapsed time, duplicate and
//! near-duplicate timestamps collapsed, cumulative distance monotonic,
//! interior elevation holes interpolated, and per-interval speed/gradient
//! precomputed.
//!
//! Heart rate, cadence and power are never synthesized. Their absence is
//! meaningful downstream (zone coverage, cadence-weighted averages), so a
//! hole stays a hole.
//!
//! Recording gaps longer than the configured pause threshold are flagged on
//! the interval and accumulated into the series' pause total. The recording
//! clock stays authoritative: paused intervals still count toward duration
//! and distance.

use serde::{Deserialize, Serialize};

use crate::config::NormalizerConfig;
use crate::errors::MetricsError;
use crate::models::{ActivityRecord, ActivityType, Sample};

/// A cleaned sample plus the derived values of the interval ending at it
///
/// The first sample of a series has no preceding interval; its `dt_s`,
/// `speed_mps` and `gradient` are 0 and it is never flagged paused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedSample {
    /// Seconds since the activity start
    pub elapsed_s: f64,
    /// Latitude in decimal degrees (if recorded)
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees (if recorded)
    pub longitude: Option<f64>,
    /// Elevation in meters; interpolated where the recording had interior
    /// holes, absent only when the whole series lacks elevation
    pub elevation_m: Option<f64>,
    /// Cumulative distance in meters, monotonic after cleaning
    pub distance_m: f64,
    /// Heart rate in bpm (never synthesized)
    pub heart_rate: Option<f64>,
    /// Cadence in rpm (never synthesized)
    pub cadence: Option<f64>,
    /// Power in watts (never synthesized)
    pub power_w: Option<f64>,
    /// Length of the interval ending at this sample, seconds
    pub dt_s: f64,
    /// Mean speed over that interval, m/s
    pub speed_mps: f64,
    /// Mean gradient over that interval, decimal (0 when unknown or
    /// near-stationary)
    pub gradient: f64,
    /// Whether that interval is a recording pause
    pub paused: bool,
}

/// The cleaned series every downstream engine consumes read-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedSeries {
    /// Gates pace-model branches and the segment distance
    pub activity_type: ActivityType,
    /// At least two samples, ordered by strictly increasing elapsed time
    pub samples: Vec<NormalizedSample>,
    /// Total seconds spent in intervals flagged as pauses
    pub total_pause_s: f64,
}

impl NormalizedSeries {
    /// Clean a raw record into a normalized series
    ///
    /// Fails with [`MetricsError::MalformedSeries`] when fewer than two
    /// valid samples survive cleaning or when cumulative distance regresses
    /// beyond the configured noise tolerance.
    pub fn build(
        record: &ActivityRecord,
        config: &NormalizerConfig,
    ) -> Result<Self, MetricsError> {
        let mut cleaned = clean_samples(&record.samples, config);

        if cleaned.len() < 2 {
            return Err(MetricsError::MalformedSeries(format!(
                "fewer than 2 valid samples remain after cleaning (found {})",
                cleaned.len()
            )));
        }

        enforce_monotonic_distance(&mut cleaned, config)?;
        fill_elevation_holes(&mut cleaned);

        let mut samples = Vec::with_capacity(cleaned.len());
        let mut total_pause_s = 0.0;

        for (i, sample) in cleaned.iter().enumerate() {
            let (dt_s, speed_mps, gradient, paused) = if i == 0 {
                (0.0, 0.0, 0.0, false)
            } else {
                let prev = &cleaned[i - 1];
                let dt = sample.elapsed_s - prev.elapsed_s;
                let dist_delta = sample.distance_m - prev.distance_m;
                let speed = dist_delta / dt;

                let gradient = match (prev.elevation_m, sample.elevation_m) {
                    (Some(prev_elev), Some(elev))
                        if dist_delta >= config.min_horizontal_delta_m =>
                    {
                        (elev - prev_elev) / dist_delta
                    }
                    _ => 0.0,
                };

                let paused = dt > config.pause_gap_threshold_s;
                if paused {
                    total_pause_s += dt;
                }

                (dt, speed, gradient, paused)
            };

            samples.push(NormalizedSample {
                elapsed_s: sample.elapsed_s,
                latitude: sample.latitude,
                longitude: sample.longitude,
                elevation_m: sample.elevation_m,
                distance_m: sample.distance_m,
                heart_rate: sample.heart_rate,
                cadence: sample.cadence,
                power_w: sample.power_w,
                dt_s,
                speed_mps,
                gradient,
                paused,
            });
        }

        Ok(Self {
            activity_type: record.activity_type,
            samples,
            total_pause_s,
        })
    }

    /// Total recorded duration in seconds
    pub fn total_duration_s(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.elapsed_s - first.elapsed_s,
            _ => 0.0,
        }
    }

    /// Total covered distance in meters
    pub fn total_distance_m(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.distance_m - first.distance_m,
            _ => 0.0,
        }
    }

    /// Accumulated positive elevation change, absent when the series has no
    /// elevation data at all
    pub fn elevation_gain_m(&self) -> Option<f64> {
        let mut gain = 0.0;
        let mut any_elevation = false;
        for pair in self.samples.windows(2) {
            if let (Some(a), Some(b)) = (pair[0].elevation_m, pair[1].elevation_m) {
                any_elevation = true;
                if b > a {
                    gain += b - a;
                }
            }
        }
        any_elevation.then_some(gain)
    }
}

/// Sort, drop invalid and duplicate samples, merge sub-threshold intervals
fn clean_samples(raw: &[Sample], config: &NormalizerConfig) -> Vec<Sample> {
    let mut sorted: Vec<Sample> = raw
        .iter()
        .filter(|s| s.elapsed_s.is_finite() && s.distance_m.is_finite())
        .cloned()
        .collect();
    sorted.sort_by(|a, b| a.elapsed_s.total_cmp(&b.elapsed_s));

    let mut cleaned: Vec<Sample> = Vec::with_capacity(sorted.len());
    for sample in sorted {
        if let Some(prev) = cleaned.last_mut() {
            let dt = sample.elapsed_s - prev.elapsed_s;
            if dt == 0.0 {
                // exact timestamp duplicate, keep the first occurrence
                continue;
            }
            if dt < config.min_time_delta_s {
                // merge into the predecessor so no interval can produce a
                // near-infinite speed; the later sample's readings win
                prev.distance_m = sample.distance_m;
                if sample.latitude.is_some() {
                    prev.latitude = sample.latitude;
                }
                if sample.longitude.is_some() {
                    prev.longitude = sample.longitude;
                }
                if sample.elevation_m.is_some() {
                    prev.elevation_m = sample.elevation_m;
                }
                if sample.heart_rate.is_some() {
                    prev.heart_rate = sample.heart_rate;
                }
                if sample.cadence.is_some() {
                    prev.cadence = sample.cadence;
                }
                if sample.power_w.is_some() {
                    prev.power_w = sample.power_w;
                }
                continue;
            }
        }
        cleaned.push(sample);
    }
    cleaned
}

/// Clamp small cumulative-distance dips; reject regressions beyond tolerance
fn enforce_monotonic_distance(
    samples: &mut [Sample],
    config: &NormalizerConfig,
) -> Result<(), MetricsError> {
    for i in 1..samples.len() {
        let prev_distance = samples[i - 1].distance_m;
        let distance = samples[i].distance_m;
        if distance < prev_distance {
            let regression = prev_distance - distance;
            if regression > config.distance_noise_tolerance_m {
                return Err(MetricsError::MalformedSeries(format!(
                    "cumulative distance regresses by {:.2} m at t={:.1} s",
                    regression, samples[i].elapsed_s
                )));
            }
            samples[i].distance_m = prev_distance;
        }
    }
    Ok(())
}

/// Linear-interpolate interior elevation holes; edge-fill leading/trailing
fn fill_elevation_holes(samples: &mut [Sample]) {
    let known: Vec<(usize, f64)> = samples
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.elevation_m.map(|e| (i, e)))
        .collect();

    if known.is_empty() {
        return;
    }

    let (first_idx, first_elev) = known[0];
    for sample in &mut samples[..first_idx] {
        sample.elevation_m = Some(first_elev);
    }

    let (last_idx, last_elev) = known[known.len() - 1];
    for sample in &mut samples[last_idx + 1..] {
        sample.elevation_m = Some(last_elev);
    }

    for pair in known.windows(2) {
        let (start_idx, start_elev) = pair[0];
        let (end_idx, end_elev) = pair[1];
        if end_idx - start_idx <= 1 {
            continue;
        }
        let start_t = samples[start_idx].elapsed_s;
        let span = samples[end_idx].elapsed_s - start_t;
        for i in start_idx + 1..end_idx {
            let frac = if span > 0.0 {
                (samples[i].elapsed_s - start_t) / span
            } else {
                0.0
            };
            samples[i].elevation_m = Some(start_elev + (end_elev - start_elev) * frac);
        }
    }
}
