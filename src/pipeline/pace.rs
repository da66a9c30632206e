// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Grade-Adjusted Pace Models
//!
//! Converts an observed speed on a gradient into the equivalent flat-ground
//! speed. Uphill intervals map to a faster flat equivalent (the athlete spent
//! more energy per meter), downhill intervals to a slower one.
//!
//! Running and walking choose between a first-order linear correction and the
//! Minetti metabolic-cost ratio. Cycling always uses a two-piece model:
//! linear uphill, cube-root drag downhill (descending speed is dominated by
//! aerodynamic drag, not rider output, so the credit grows much slower than
//! linearly).
//!
//! Gradients are clamped before entering any formula. The quintic cost fit
//! turns negative below roughly -40 % grade, so the running clamp stops well
//! above that root; outside the clamp the models extrapolate nonsense anyway.
//! Every function here is a pure, deterministic mapping of
//! (speed, gradient, activity type).

use serde::{Deserialize, Serialize};

use crate::constants::gap;
use crate::models::ActivityType;
use crate::pipeline::normalizer::NormalizedSeries;

/// Flat-equivalent speed model applied to running and walking
///
/// Selected once per pipeline run via configuration; cycling ignores it and
/// always applies its own two-piece model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapFormula {
    /// First-order correction `v * (1 + grade_pct / 100)`; reference branch
    Linear,
    /// Minetti metabolic-cost ratio `v * C(s) / C(0)`
    #[default]
    Metabolic,
}

/// Flat-equivalent speed in m/s for one interval
///
/// Non-positive input speed yields 0.0; the gradient is clamped to the
/// activity type's valid range before evaluation, never rejected.
///
/// # Examples
///
/// ```rust
/// use paceline::models::ActivityType;
/// use paceline::pipeline::pace::{flat_equivalent_speed, GapFormula};
///
/// // 12 km/h up a 6 % grade is worth about 12.4 km/h on the flat
/// let v = flat_equivalent_speed(12.0 / 3.6, 0.06, ActivityType::Running, GapFormula::Metabolic);
/// assert!((v * 3.6 - 12.399).abs() < 0.001);
/// ```
pub fn flat_equivalent_speed(
    speed_mps: f64,
    gradient: f64,
    activity_type: ActivityType,
    formula: GapFormula,
) -> f64 {
    if speed_mps <= 0.0 {
        return 0.0;
    }

    match activity_type {
        ActivityType::Running | ActivityType::Walking => {
            let s = gradient.clamp(gap::FOOT_GRADE_MIN, gap::FOOT_GRADE_MAX);
            match formula {
                GapFormula::Linear => {
                    speed_mps * (1.0 + s * 100.0 / gap::LINEAR_FOOT_DIVISOR)
                }
                GapFormula::Metabolic => speed_mps * metabolic_cost(s) / gap::FLAT_COST,
            }
        }
        ActivityType::Cycling => {
            let s = gradient.clamp(gap::CYCLE_GRADE_MIN, gap::CYCLE_GRADE_MAX);
            if s >= 0.0 {
                speed_mps * (1.0 + s * 100.0 / gap::CYCLE_UPHILL_DIVISOR)
            } else {
                speed_mps * (1.0 + s.abs() * 100.0 / gap::CYCLE_DOWNHILL_DIVISOR).cbrt()
            }
        }
    }
}

/// Per-interval flat-equivalent speeds for a whole normalized series
///
/// One value per sample, aligned with `series.samples`. The leading sample
/// has no preceding interval and reports 0.0 like its raw speed.
pub fn flat_equivalent_series(series: &NormalizedSeries, formula: GapFormula) -> Vec<f64> {
    series
        .samples
        .iter()
        .map(|sample| {
            flat_equivalent_speed(
                sample.speed_mps,
                sample.gradient,
                series.activity_type,
                formula,
            )
        })
        .collect()
}

/// Metabolic cost of grade running in J/(kg*m), Horner evaluation
fn metabolic_cost(gradient: f64) -> f64 {
    gap::METABOLIC_COEFFS
        .iter()
        .fold(0.0_f64, |acc, &coeff| acc * gradient + coeff)
}
