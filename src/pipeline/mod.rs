// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Metrics Pipeline
//!
//! The computation core: raw record in, derived metrics out.
//!
//! ```text
//! ActivityRecord -> Normalizer -> +-> Segment Builder --+
//!                                 +-> Activity Summary --+-> ActivityMetrics
//!                                 +-> Zone Engine -> TE -+
//!                                 +-> Personal Bests ----+
//! ```
//!
//! Every stage is a pure function over the immutable [`NormalizedSeries`];
//! the whole pipeline holds no state beyond its configuration, so activities
//! can be recomputed concurrently and repeatedly. Recomputing the same record
//! with the same profile yields byte-identical output, which is why no stage
//! records wall-clock timestamps.
//!
//! A failed zone resolution (no heart rate, unresolvable max HR) degrades
//! the affected fields to absent instead of aborting the run; only an
//! unusable input series is a hard error.

pub mod best_efforts;
pub mod normalizer;
pub mod pace;
pub mod segments;
pub mod training_effect;
pub mod zones;

use serde::{Deserialize, Serialize};
use tracing::{debug_span, warn};

use crate::config::MetricsConfig;
use crate::errors::MetricsError;
use crate::models::{ActivityRecord, ActivityType, AthleteProfile};

use best_efforts::{extract_personal_bests, PersonalBest};
use normalizer::NormalizedSeries;
use pace::flat_equivalent_series;
use segments::{build_segments, Segment};
use training_effect::TrainingEffectResult;
use zones::ZoneDistribution;

/// Version tag stamped on every [`ActivityMetrics`]
///
/// Bumped whenever a formula or constant changes meaning, so external stores
/// can detect stale metrics and trigger recomputation.
pub const MODEL_VERSION: u32 = 3;

/// Whole-activity aggregates
///
/// Pace statistics are restricted to intervals whose pace falls inside the
/// activity type's plausibility band; with no qualifying interval they are
/// absent. Fields backed by optional sensors are absent when the series
/// never carries the sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// Covered distance, meters
    pub total_distance_m: f64,
    /// Recorded duration, seconds
    pub total_duration_s: f64,
    /// Seconds spent in detected recording pauses
    pub total_pause_s: f64,
    /// Mean speed over the recorded duration, m/s
    pub avg_speed_mps: f64,
    /// Flat-equivalent distance divided by duration, m/s
    pub gap_speed_mps: f64,
    /// Fastest in-band interval speed, m/s
    pub max_speed_mps: Option<f64>,
    /// 5th percentile of in-band interval pace, seconds per kilometer
    pub fastest_pace_s_per_km: Option<f64>,
    /// 95th percentile of in-band interval pace, seconds per kilometer
    pub slowest_pace_s_per_km: Option<f64>,
    /// Time-weighted mean heart rate, bpm
    pub avg_heart_rate: Option<f64>,
    /// Highest recorded heart rate, bpm
    pub max_heart_rate: Option<f64>,
    /// Time-weighted mean power, watts
    pub avg_power: Option<f64>,
    /// Time-weighted mean cadence, rpm
    pub avg_cadence: Option<f64>,
    /// Doubled one-foot cadence integrated over time; running and walking
    /// only
    pub total_steps: Option<u64>,
    /// Accumulated positive elevation change, meters (0 without elevation)
    pub elevation_gain_m: f64,
}

impl ActivitySummary {
    /// Aggregate a normalized series into whole-activity statistics
    pub fn from_series(series: &NormalizedSeries, config: &MetricsConfig) -> Self {
        let duration = series.total_duration_s();
        let distance = series.total_distance_m();
        let band = config.pace_bands.band_for(series.activity_type);
        let flat_speeds = flat_equivalent_series(series, config.pace.gap_formula);

        let mut flat_distance = 0.0;
        let mut in_band_paces: Vec<f64> = Vec::new();
        let mut max_speed: Option<f64> = None;
        let mut hr_weighted = 0.0;
        let mut hr_time = 0.0;
        let mut max_hr: Option<f64> = None;
        let mut power_weighted = 0.0;
        let mut power_time = 0.0;
        let mut cadence_weighted = 0.0;
        let mut cadence_time = 0.0;
        let mut steps = 0.0;
        let mut any_cadence = false;

        for (sample, &flat_speed) in series.samples.iter().zip(&flat_speeds) {
            if let Some(hr) = sample.heart_rate {
                max_hr = Some(max_hr.map_or(hr, |m: f64| m.max(hr)));
            }
            if sample.dt_s <= 0.0 {
                continue;
            }
            flat_distance += flat_speed * sample.dt_s;

            if band.contains_speed(sample.speed_mps) {
                in_band_paces.push(1000.0 / sample.speed_mps);
                max_speed = Some(max_speed.map_or(sample.speed_mps, |m: f64| m.max(sample.speed_mps)));
            }
            if let Some(hr) = sample.heart_rate {
                hr_weighted += hr * sample.dt_s;
                hr_time += sample.dt_s;
            }
            if let Some(power) = sample.power_w {
                power_weighted += power * sample.dt_s;
                power_time += sample.dt_s;
            }
            if let Some(cadence) = sample.cadence {
                cadence_weighted += cadence * sample.dt_s;
                cadence_time += sample.dt_s;
                any_cadence = true;
                steps += cadence * 2.0 * sample.dt_s / 60.0;
            }
        }

        in_band_paces.sort_by(f64::total_cmp);
        let fastest = (!in_band_paces.is_empty()).then(|| percentile(&in_band_paces, 0.05));
        let slowest = (!in_band_paces.is_empty()).then(|| percentile(&in_band_paces, 0.95));

        let total_steps = (series.activity_type.on_foot() && any_cadence)
            .then(|| steps.round() as u64);

        Self {
            total_distance_m: distance,
            total_duration_s: duration,
            total_pause_s: series.total_pause_s,
            avg_speed_mps: if duration > 0.0 { distance / duration } else { 0.0 },
            gap_speed_mps: if duration > 0.0 { flat_distance / duration } else { 0.0 },
            max_speed_mps: max_speed,
            fastest_pace_s_per_km: fastest,
            slowest_pace_s_per_km: slowest,
            avg_heart_rate: (hr_time > 0.0).then(|| hr_weighted / hr_time),
            max_heart_rate: max_hr,
            avg_power: (power_time > 0.0).then(|| power_weighted / power_time),
            avg_cadence: (cadence_time > 0.0).then(|| cadence_weighted / cadence_time),
            total_steps,
            elevation_gain_m: series.elevation_gain_m().unwrap_or(0.0),
        }
    }
}

/// Linear-interpolated quantile of an ascending slice
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let fraction = position - lower as f64;
    if lower + 1 < sorted.len() {
        sorted[lower] + fraction * (sorted[lower + 1] - sorted[lower])
    } else {
        sorted[lower]
    }
}

/// Everything one recompute run derives for one activity
///
/// `zones` and `training_effect` are absent when the athlete data or heart
/// rate needed for them is missing; the rest is always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityMetrics {
    /// Identifier of the source activity
    pub activity_id: String,
    /// The formula set these metrics were computed with
    pub model_version: u32,
    /// Activity type the computation branched on
    pub activity_type: ActivityType,
    /// Whole-activity aggregates
    pub summary: ActivitySummary,
    /// Fixed-distance splits
    pub segments: Vec<Segment>,
    /// Time-in-zone histogram, when a heart-rate basis exists
    pub zones: Option<ZoneDistribution>,
    /// EPOC and Training Effect, when a heart-rate basis exists
    pub training_effect: Option<TrainingEffectResult>,
    /// Best efforts over the type's canonical distances
    pub personal_bests: Vec<PersonalBest>,
}

/// The single entry point collaborators call
///
/// Holds only configuration; recomputation is pure, so one engine can serve
/// any number of activities, sequentially or in parallel.
///
/// # Examples
///
/// ```rust
/// use chrono::Utc;
/// use paceline::models::{ActivityRecord, ActivityType, AthleteProfile, Sample};
/// use paceline::pipeline::MetricsEngine;
///
/// let engine = MetricsEngine::default();
/// let record = ActivityRecord {
///     id: "a-1".to_string(),
///     name: "Track Repeats".to_string(),
///     activity_type: ActivityType::Running,
///     start_time: Utc::now(),
///     samples: (0..=100).map(|i| Sample::at(i as f64 * 8.0, i as f64 * 20.0)).collect(),
/// };
/// let metrics = engine.recompute(&record, &AthleteProfile::default()).unwrap();
/// assert_eq!(metrics.segments.len(), 2);
/// assert!(metrics.zones.is_none()); // no heart rate in the record
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: MetricsConfig,
}

impl MetricsEngine {
    /// Engine with the given configuration
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Normalize a raw record and derive all metrics
    ///
    /// Fails only when the input series is unusable
    /// ([`MetricsError::MalformedSeries`]); missing athlete data degrades
    /// the affected fields to absent instead.
    pub fn recompute(
        &self,
        record: &ActivityRecord,
        profile: &AthleteProfile,
    ) -> Result<ActivityMetrics, MetricsError> {
        let span = debug_span!(
            "recompute",
            activity_id = %record.id,
            activity_type = ?record.activity_type,
            samples = record.samples.len(),
            model_version = MODEL_VERSION,
        );
        let _guard = span.enter();

        let series = NormalizedSeries::build(record, &self.config.normalizer)?;
        self.metrics_for_series(&series, &record.id, profile)
    }

    /// Derive all metrics for an already-normalized series
    ///
    /// For callers that stage the pipeline themselves.
    pub fn metrics_for_series(
        &self,
        series: &NormalizedSeries,
        activity_id: &str,
        profile: &AthleteProfile,
    ) -> Result<ActivityMetrics, MetricsError> {
        let summary = ActivitySummary::from_series(series, &self.config);
        let segments = build_segments(series, self.config.pace.gap_formula);
        let personal_bests = extract_personal_bests(series);

        let (zones, training_effect) =
            match ZoneDistribution::from_series(series, profile, &self.config.zones) {
                Ok(zones) => {
                    let te = training_effect::compute(
                        series,
                        &zones,
                        profile,
                        &self.config.training_effect,
                    );
                    (Some(zones), Some(te))
                }
                Err(MetricsError::InsufficientAthleteData(reason)) => {
                    warn!(
                        activity_id = %activity_id,
                        reason = %reason,
                        "Zone and training-effect metrics unavailable"
                    );
                    (None, None)
                }
                Err(err) => return Err(err),
            };

        Ok(ActivityMetrics {
            activity_id: activity_id.to_string(),
            model_version: MODEL_VERSION,
            activity_type: series.activity_type,
            summary,
            segments,
            zones,
            training_effect,
            personal_bests,
        })
    }
}
