// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Heart-Rate Zone Engine
//!
//! Classifies every heart-rate-bearing interval of a normalized series into
//! one of five Karvonen zones and accumulates time per zone.
//!
//! Zone bounds come from heart-rate reserve: `HRR = HRmax - HRrest`, zone
//! bound = `HRR * intensity + HRrest`. Max HR resolution order is explicit
//! profile value, then the configured age formula; no explicit value and no
//! age is an [`MetricsError::InsufficientAthleteData`] failure. Readings
//! below zone 1 classify into zone 1 and readings above zone 5 into zone 5,
//! so every HR-bearing interval lands in exactly one zone and the zone total
//! equals the HR-covered duration.

use serde::{Deserialize, Serialize};

use crate::config::ZoneConfig;
use crate::constants::heart_rate;
use crate::errors::MetricsError;
use crate::models::AthleteProfile;
use crate::pipeline::normalizer::NormalizedSeries;

/// Age-based maximum heart rate estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxHrFormula {
    /// Gellish regression `206.9 - 0.67 * age`, replaced by the
    /// obesity-adjusted `200 - 0.5 * age` when BMI exceeds 30
    #[default]
    Gellish,
    /// Classic estimate `220 - age`
    Classic,
}

impl MaxHrFormula {
    /// Estimated max heart rate in bpm for an athlete of the given age
    pub fn estimate(&self, age: u32, bmi: Option<f64>) -> f64 {
        let age = f64::from(age);
        match self {
            MaxHrFormula::Gellish => match bmi {
                Some(bmi) if bmi > heart_rate::BMI_OBESITY_THRESHOLD => {
                    heart_rate::OBESE_INTERCEPT - heart_rate::OBESE_SLOPE * age
                }
                _ => heart_rate::GELLISH_INTERCEPT - heart_rate::GELLISH_SLOPE * age,
            },
            MaxHrFormula::Classic => heart_rate::CLASSIC_INTERCEPT - age,
        }
    }
}

/// Resolve an athlete's max heart rate
///
/// Explicit profile value wins; otherwise the formula is applied to the
/// athlete's age (and BMI when weight and height are known).
pub fn resolve_max_hr(
    profile: &AthleteProfile,
    formula: MaxHrFormula,
) -> Result<f64, MetricsError> {
    if let Some(max_hr) = profile.max_hr {
        return Ok(max_hr);
    }
    match profile.age {
        Some(age) => Ok(formula.estimate(age, profile.bmi())),
        None => Err(MetricsError::InsufficientAthleteData(
            "no explicit max heart rate and no age to derive one".to_string(),
        )),
    }
}

/// Time-in-zone histogram plus the resolved Karvonen parameters
///
/// Carries the resolved max/resting HR so downstream consumers (the
/// training-effect engine) reuse the same resolution instead of repeating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDistribution {
    /// Cumulative seconds per zone, index 0 = zone 1
    pub zone_seconds: [f64; 5],
    /// Total duration of heart-rate-bearing intervals, seconds
    pub hr_covered_s: f64,
    /// Resolved maximum heart rate, bpm
    pub max_hr_bpm: f64,
    /// Resolved resting heart rate, bpm
    pub resting_hr_bpm: f64,
    /// Zone bounds in bpm, derived from heart-rate reserve
    pub bounds_bpm: [(f64, f64); 5],
}

impl ZoneDistribution {
    /// Classify a normalized series into zones
    ///
    /// Fails with [`MetricsError::InsufficientAthleteData`] when max HR
    /// cannot be resolved, when resting HR is not below max HR, or when the
    /// series carries no heart rate at all.
    pub fn from_series(
        series: &NormalizedSeries,
        profile: &AthleteProfile,
        config: &ZoneConfig,
    ) -> Result<Self, MetricsError> {
        let max_hr = resolve_max_hr(profile, config.max_hr_formula)?;
        let resting_hr = profile.resting_hr.unwrap_or(config.default_resting_hr);

        let reserve = max_hr - resting_hr;
        if reserve <= 0.0 {
            return Err(MetricsError::InsufficientAthleteData(format!(
                "resting heart rate {resting_hr} bpm is not below max heart rate {max_hr} bpm"
            )));
        }

        let fractions = profile.hr_zone_bounds.unwrap_or(config.zone_bounds);
        let bounds_bpm =
            fractions.map(|(lo, hi)| (reserve * lo + resting_hr, reserve * hi + resting_hr));

        let mut zone_seconds = [0.0_f64; 5];
        let mut hr_covered_s = 0.0;
        for sample in &series.samples {
            if sample.dt_s <= 0.0 {
                continue;
            }
            if let Some(hr) = sample.heart_rate {
                let zone = bounds_bpm
                    .iter()
                    .rposition(|&(lo, _)| hr >= lo)
                    .unwrap_or(0);
                zone_seconds[zone] += sample.dt_s;
                hr_covered_s += sample.dt_s;
            }
        }

        if hr_covered_s <= 0.0 {
            return Err(MetricsError::InsufficientAthleteData(
                "series contains no heart-rate samples".to_string(),
            ));
        }

        Ok(Self {
            zone_seconds,
            hr_covered_s,
            max_hr_bpm: max_hr,
            resting_hr_bpm: resting_hr,
            bounds_bpm,
        })
    }

    /// Sum of all zone durations, equal to the HR-covered duration
    pub fn total_zone_s(&self) -> f64 {
        self.zone_seconds.iter().sum()
    }
}
