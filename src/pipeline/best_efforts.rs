// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Personal-Best Extractor
//!
//! Finds the fastest contiguous stretch covering each canonical distance of
//! the activity type, independent of segment boundaries.
//!
//! The cumulative distance curve is piecewise linear in time, so the fastest
//! window always has at least one edge exactly on a sample. Two linear
//! two-pointer sweeps therefore find the true optimum: one anchors window
//! starts on samples and interpolates the end, the other anchors ends on
//! samples and interpolates the start. Distances longer than the activity
//! are simply absent from the result, never an error.

use serde::{Deserialize, Serialize};

use crate::constants::best_efforts;
use crate::models::ActivityType;
use crate::pipeline::normalizer::NormalizedSeries;

/// Fastest effort over one canonical distance within a single activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalBest {
    /// Canonical distance key, meters
    pub distance_m: f64,
    /// Fastest time to cover that distance, seconds
    pub duration_s: f64,
    /// Where the winning window starts, seconds from activity start
    pub start_elapsed_s: f64,
    /// Fixed-distance segment containing the window start
    pub achieved_at_segment_index: usize,
}

/// Scan a normalized series for best efforts over the canonical distances
pub fn extract_personal_bests(series: &NormalizedSeries) -> Vec<PersonalBest> {
    let targets: &[f64] = match series.activity_type {
        ActivityType::Running => &best_efforts::RUNNING_DISTANCES_M,
        ActivityType::Cycling => &best_efforts::CYCLING_DISTANCES_M,
        ActivityType::Walking => &best_efforts::WALKING_DISTANCES_M,
    };

    let total = series.total_distance_m();
    let segment_distance = series.activity_type.segment_distance_m();
    let points: Vec<(f64, f64)> = series
        .samples
        .iter()
        .map(|s| (s.elapsed_s, s.distance_m))
        .collect();

    let mut bests = Vec::new();
    for &target in targets {
        if total < target {
            continue;
        }
        if let Some(window) = best_window(&points, target) {
            let start_distance = window.start_distance_m - points[0].1;
            bests.push(PersonalBest {
                distance_m: target,
                duration_s: window.duration_s,
                start_elapsed_s: window.start_elapsed_s,
                achieved_at_segment_index: (start_distance / segment_distance).floor() as usize,
            });
        }
    }
    bests
}

struct Window {
    duration_s: f64,
    start_elapsed_s: f64,
    start_distance_m: f64,
}

/// Minimum-duration window covering `target` meters of the distance curve
fn best_window(points: &[(f64, f64)], target: f64) -> Option<Window> {
    let n = points.len();
    if n < 2 || target <= 0.0 {
        return None;
    }
    let mut best: Option<Window> = None;

    // sweep 1: window start on a sample, end interpolated
    let mut j = 1;
    for i in 0..n {
        let (start_t, start_d) = points[i];
        let need = start_d + target;
        if j <= i {
            j = i + 1;
        }
        while j < n && points[j].1 < need {
            j += 1;
        }
        if j >= n {
            // later starts need even more distance
            break;
        }
        let (t0, d0) = points[j - 1];
        let (t1, d1) = points[j];
        let end_t = t0 + (need - d0) / (d1 - d0) * (t1 - t0);
        let duration = end_t - start_t;
        if best.as_ref().map_or(true, |b| duration < b.duration_s) {
            best = Some(Window {
                duration_s: duration,
                start_elapsed_s: start_t,
                start_distance_m: start_d,
            });
        }
    }

    // sweep 2: window end on a sample, start interpolated
    let mut i = 0;
    for j in 1..n {
        let (end_t, end_d) = points[j];
        let need = end_d - target;
        if need < points[0].1 {
            continue;
        }
        while i + 1 < n && points[i + 1].1 <= need {
            i += 1;
        }
        let (t0, d0) = points[i];
        let (t1, d1) = points[i + 1];
        let start_t = if d0 < need {
            t0 + (need - d0) / (d1 - d0) * (t1 - t0)
        } else {
            t0
        };
        let duration = end_t - start_t;
        if best.as_ref().map_or(true, |b| duration < b.duration_s) {
            best = Some(Window {
                duration_s: duration,
                start_elapsed_s: start_t,
                start_distance_m: need,
            });
        }
    }

    best
}
