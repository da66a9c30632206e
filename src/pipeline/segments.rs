// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Segment Builder
//!
//! Partitions a normalized series into fixed-distance splits (1 km running
//! and walking, 5 km cycling). An interval that crosses a split boundary is
//! divided proportionally by distance, so no time or distance is counted
//! twice and segment durations sum exactly to the activity duration. The
//! remainder after the last full split becomes a trailing segment flagged
//! `partial`.
//!
//! Heart rate, power and cadence averages are time-weighted over only the
//! intervals that carry the field; a segment with no coverage for a field
//! reports it as absent. Elevation gain accumulates positive deltas only.

use serde::{Deserialize, Serialize};

use crate::pipeline::normalizer::{NormalizedSample, NormalizedSeries};
use crate::pipeline::pace::{flat_equivalent_speed, GapFormula};

/// One fixed-distance split of an activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// 0-based position within the activity
    pub index: usize,
    /// Seconds from activity start to the segment's first meter
    pub start_elapsed_s: f64,
    /// Seconds from activity start to the segment's last meter
    pub end_elapsed_s: f64,
    /// Covered distance; the type's split distance except for the trailing
    /// partial segment
    pub distance_m: f64,
    /// Time spent in the segment, seconds
    pub duration_s: f64,
    /// Mean speed, m/s
    pub avg_speed_mps: f64,
    /// Mean flat-equivalent speed, m/s
    pub gap_speed_mps: f64,
    /// Time-weighted mean heart rate over covered intervals, bpm
    pub avg_heart_rate: Option<f64>,
    /// Time-weighted mean power over covered intervals, watts
    pub avg_power: Option<f64>,
    /// Time-weighted mean cadence over covered intervals, rpm
    pub avg_cadence: Option<f64>,
    /// Accumulated positive elevation change, meters
    pub elevation_gain_m: f64,
    /// Whether this is the shorter trailing remainder
    pub partial: bool,
}

/// Split a normalized series into fixed-distance segments
pub fn build_segments(series: &NormalizedSeries, formula: GapFormula) -> Vec<Segment> {
    let target = series.activity_type.segment_distance_m();
    let mut segments = Vec::new();

    let Some(first) = series.samples.first() else {
        return segments;
    };
    let mut acc = SegmentAccumulator::starting_at(first.elapsed_s);

    for pair in series.samples.windows(2) {
        let prev = &pair[0];
        let cur = &pair[1];

        let mut dt = cur.dt_s;
        let mut dist = cur.distance_m - prev.distance_m;
        let mut elev_delta = match (prev.elevation_m, cur.elevation_m) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        };
        let v_flat =
            flat_equivalent_speed(cur.speed_mps, cur.gradient, series.activity_type, formula);

        // split the interval at every boundary it crosses
        loop {
            let remaining = target - acc.distance_m;
            if dist > 0.0 && dist >= remaining {
                let fraction = remaining / dist;
                let t_share = dt * fraction;
                let elev_share = elev_delta * fraction;
                acc.add(t_share, remaining, v_flat, cur, elev_share);

                let end_elapsed = acc.start_elapsed_s + acc.duration_s;
                segments.push(acc.finish(segments.len(), target, false));
                acc = SegmentAccumulator::starting_at(end_elapsed);

                dt -= t_share;
                dist -= remaining;
                elev_delta -= elev_share;
            } else {
                acc.add(dt, dist, v_flat, cur, elev_delta);
                break;
            }
        }
    }

    if acc.duration_s > 0.0 || acc.distance_m > 0.0 {
        let distance = acc.distance_m;
        segments.push(acc.finish(segments.len(), distance, true));
    }

    segments
}

/// Running totals for the segment currently being filled
struct SegmentAccumulator {
    start_elapsed_s: f64,
    duration_s: f64,
    distance_m: f64,
    flat_distance_m: f64,
    hr_weighted: f64,
    hr_time_s: f64,
    power_weighted: f64,
    power_time_s: f64,
    cadence_weighted: f64,
    cadence_time_s: f64,
    elevation_gain_m: f64,
}

impl SegmentAccumulator {
    fn starting_at(start_elapsed_s: f64) -> Self {
        Self {
            start_elapsed_s,
            duration_s: 0.0,
            distance_m: 0.0,
            flat_distance_m: 0.0,
            hr_weighted: 0.0,
            hr_time_s: 0.0,
            power_weighted: 0.0,
            power_time_s: 0.0,
            cadence_weighted: 0.0,
            cadence_time_s: 0.0,
            elevation_gain_m: 0.0,
        }
    }

    /// Fold an interval share into the running totals
    ///
    /// Sensor fields are read from the interval's ending sample.
    fn add(&mut self, dt: f64, dist: f64, v_flat: f64, sample: &NormalizedSample, elev_delta: f64) {
        self.duration_s += dt;
        self.distance_m += dist;
        self.flat_distance_m += v_flat * dt;
        if let Some(hr) = sample.heart_rate {
            self.hr_weighted += hr * dt;
            self.hr_time_s += dt;
        }
        if let Some(power) = sample.power_w {
            self.power_weighted += power * dt;
            self.power_time_s += dt;
        }
        if let Some(cadence) = sample.cadence {
            self.cadence_weighted += cadence * dt;
            self.cadence_time_s += dt;
        }
        if elev_delta > 0.0 {
            self.elevation_gain_m += elev_delta;
        }
    }

    fn finish(&self, index: usize, distance_m: f64, partial: bool) -> Segment {
        let duration = self.duration_s;
        Segment {
            index,
            start_elapsed_s: self.start_elapsed_s,
            end_elapsed_s: self.start_elapsed_s + duration,
            distance_m,
            duration_s: duration,
            avg_speed_mps: if duration > 0.0 {
                distance_m / duration
            } else {
                0.0
            },
            gap_speed_mps: if duration > 0.0 {
                self.flat_distance_m / duration
            } else {
                0.0
            },
            avg_heart_rate: (self.hr_time_s > 0.0).then(|| self.hr_weighted / self.hr_time_s),
            avg_power: (self.power_time_s > 0.0).then(|| self.power_weighted / self.power_time_s),
            avg_cadence: (self.cadence_time_s > 0.0)
                .then(|| self.cadence_weighted / self.cadence_time_s),
            elevation_gain_m: self.elevation_gain_m,
            partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizerConfig;
    use crate::models::{ActivityRecord, ActivityType, Sample};
    use chrono::Utc;

    fn normalized(activity_type: ActivityType, samples: Vec<Sample>) -> NormalizedSeries {
        let record = ActivityRecord {
            id: "test".to_string(),
            name: "Segment Test".to_string(),
            activity_type,
            start_time: Utc::now(),
            samples,
        };
        NormalizedSeries::build(&record, &NormalizerConfig::default()).unwrap()
    }

    /// Constant 2.5 m/s: one sample every 40 s and 100 m
    fn constant_run(total_m: usize) -> NormalizedSeries {
        let samples = (0..=total_m / 100)
            .map(|i| Sample::at(i as f64 * 40.0, i as f64 * 100.0))
            .collect();
        normalized(ActivityType::Running, samples)
    }

    #[test]
    fn test_constant_pace_run_splits_exactly() {
        let series = constant_run(10_000);
        let segments = build_segments(&series, GapFormula::Metabolic);

        assert_eq!(segments.len(), 10);
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.index, i);
            assert!(!segment.partial);
            assert_eq!(segment.distance_m, 1000.0);
            assert!((segment.duration_s - 400.0).abs() < 1e-9);
            assert!((segment.avg_speed_mps - 2.5).abs() < 1e-9);
            assert!((segment.start_elapsed_s - i as f64 * 400.0).abs() < 1e-9);
            assert!((segment.end_elapsed_s - (i + 1) as f64 * 400.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_boundary_crossing_is_interpolated() {
        // 800 m in 400 s, then 1200 m in 600 s: the 1 km boundary falls
        // one sixth into the second interval
        let series = normalized(
            ActivityType::Running,
            vec![
                Sample::at(0.0, 0.0),
                Sample::at(400.0, 800.0),
                Sample::at(1000.0, 2000.0),
            ],
        );
        let segments = build_segments(&series, GapFormula::Metabolic);

        assert_eq!(segments.len(), 2);
        assert!((segments[0].duration_s - 500.0).abs() < 1e-9);
        assert!((segments[0].end_elapsed_s - 500.0).abs() < 1e-9);
        assert!((segments[1].start_elapsed_s - 500.0).abs() < 1e-9);
        assert!((segments[1].duration_s - 500.0).abs() < 1e-9);
        assert!(!segments[0].partial);
        assert!(!segments[1].partial);
    }

    #[test]
    fn test_single_interval_spanning_several_boundaries() {
        // one 3.5 km interval must yield three full splits plus a remainder
        let series = normalized(
            ActivityType::Running,
            vec![Sample::at(0.0, 0.0), Sample::at(1400.0, 3500.0)],
        );
        let segments = build_segments(&series, GapFormula::Metabolic);

        assert_eq!(segments.len(), 4);
        assert!(segments[..3].iter().all(|s| !s.partial));
        assert!(segments[3].partial);
        assert_eq!(segments[3].distance_m, 500.0);
        let total: f64 = segments.iter().map(|s| s.duration_s).sum();
        assert!((total - 1400.0).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_partial_segment() {
        let series = constant_run(2500);
        let segments = build_segments(&series, GapFormula::Metabolic);

        assert_eq!(segments.len(), 3);
        assert!(!segments[0].partial);
        assert!(!segments[1].partial);
        assert!(segments[2].partial);
        assert!((segments[2].distance_m - 500.0).abs() < 1e-9);
        assert!((segments[2].duration_s - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_durations_sum_to_total_even_with_pauses() {
        let series = normalized(
            ActivityType::Running,
            vec![
                Sample::at(0.0, 0.0),
                Sample::at(10.0, 25.0),
                Sample::at(50.0, 30.0),
                Sample::at(60.0, 55.0),
            ],
        );
        let segments = build_segments(&series, GapFormula::Metabolic);

        assert_eq!(segments.len(), 1);
        assert!(segments[0].partial);
        assert!((segments[0].duration_s - series.total_duration_s()).abs() < 1e-9);
        assert!((segments[0].distance_m - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_cycling_uses_five_km_splits() {
        let samples = (0..=20)
            .map(|i| Sample::at(i as f64 * 60.0, i as f64 * 500.0))
            .collect();
        let series = normalized(ActivityType::Cycling, samples);
        let segments = build_segments(&series, GapFormula::Metabolic);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].distance_m, 5000.0);
        assert!(!segments[1].partial);
    }

    #[test]
    fn test_field_averages_are_time_weighted_over_coverage() {
        let mut samples: Vec<Sample> = (0..=4)
            .map(|i| Sample::at(i as f64 * 60.0, i as f64 * 100.0))
            .collect();
        // heart rate on two of four intervals, 60 s each
        samples[1].heart_rate = Some(120.0);
        samples[2].heart_rate = Some(160.0);
        // power never present
        let series = normalized(ActivityType::Running, samples);
        let segments = build_segments(&series, GapFormula::Metabolic);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].avg_heart_rate, Some(140.0));
        assert_eq!(segments[0].avg_power, None);
        assert_eq!(segments[0].avg_cadence, None);
    }

    #[test]
    fn test_gap_speed_exceeds_raw_speed_uphill() {
        // steady 6 % climb at 100 m per 30 s
        let samples: Vec<Sample> = (0..=10)
            .map(|i| {
                let mut s = Sample::at(i as f64 * 30.0, i as f64 * 100.0);
                s.elevation_m = Some(100.0 + 6.0 * i as f64);
                s
            })
            .collect();
        let series = normalized(ActivityType::Running, samples);
        let segments = build_segments(&series, GapFormula::Metabolic);

        assert_eq!(segments.len(), 1);
        assert!(!segments[0].partial);
        let raw = segments[0].avg_speed_mps;
        let gap = segments[0].gap_speed_mps;
        assert!((raw - 100.0 / 30.0).abs() < 1e-9);
        assert!((gap - raw * 1.03326).abs() < 1e-3);
        assert!((segments[0].elevation_gain_m - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_elevation_gain_apportioned_at_boundary() {
        // 2 km climbing 20 m at constant grade: each split gains 10 m
        let samples: Vec<Sample> = (0..=4)
            .map(|i| {
                let mut s = Sample::at(i as f64 * 200.0, i as f64 * 500.0);
                s.elevation_m = Some(100.0 + 5.0 * i as f64);
                s
            })
            .collect();
        let series = normalized(ActivityType::Running, samples);
        let segments = build_segments(&series, GapFormula::Metabolic);

        assert_eq!(segments.len(), 2);
        assert!((segments[0].elevation_gain_m - 10.0).abs() < 1e-9);
        assert!((segments[1].elevation_gain_m - 10.0).abs() < 1e-9);
    }
}
