// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Training-Effect Engine
//!
//! Single-pass EPOC accumulation over the Karvonen intensity of a normalized
//! series, scaled by elevation and athlete weight, then mapped through a
//! diminishing-returns curve into a Training Effect score hard-bounded to
//! [1.0, 5.0].
//!
//! The engine consumes an already-resolved [`ZoneDistribution`], so the
//! heart-rate basis is guaranteed to exist here; the no-heart-rate failure
//! belongs to the zone engine. Missing elevation or weight degrade to
//! neutral factors, never to an error.

use serde::{Deserialize, Serialize};

use crate::config::TrainingEffectConfig;
use crate::constants::training_effect as te;
use crate::models::AthleteProfile;
use crate::pipeline::normalizer::NormalizedSeries;
use crate::pipeline::zones::ZoneDistribution;

/// How per-interval intensity aggregates into EPOC
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpocFormula {
    /// Integrate the Karvonen intensity ratio over every heart-rate-bearing
    /// interval
    #[default]
    HrReserve,
    /// Session-mean intensity times total activity duration; the coarser
    /// legacy formulation, kept selectable for comparability with older
    /// computations
    Session,
}

/// EPOC accumulation and the resulting bounded Training Effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingEffectResult {
    /// EPOC before the athlete-weight adjustment
    pub epoc_raw: f64,
    /// EPOC scaled by athlete weight against the 70 kg reference
    pub epoc_adjusted: f64,
    /// Training Effect score, always within [1.0, 5.0]
    pub training_effect: f64,
    /// Climb scaling applied to EPOC (1.0 when the series has no elevation)
    pub elevation_factor: f64,
}

/// Compute EPOC and Training Effect for a series with a resolved zone basis
pub fn compute(
    series: &NormalizedSeries,
    zones: &ZoneDistribution,
    profile: &AthleteProfile,
    config: &TrainingEffectConfig,
) -> TrainingEffectResult {
    let reserve = zones.max_hr_bpm - zones.resting_hr_bpm;
    let elevation_factor = elevation_factor(series, config);

    let epoc_raw = match config.epoc_formula {
        EpocFormula::HrReserve => {
            let mut intensity_minutes = 0.0;
            for sample in &series.samples {
                if sample.dt_s <= 0.0 {
                    continue;
                }
                if let Some(hr) = sample.heart_rate {
                    let intensity = ((hr - zones.resting_hr_bpm) / reserve).clamp(0.0, 1.0);
                    intensity_minutes += intensity * sample.dt_s / 60.0;
                }
            }
            intensity_minutes * config.epoc_rate_per_min * elevation_factor
        }
        EpocFormula::Session => {
            let mut hr_seconds = 0.0;
            let mut covered_s = 0.0;
            for sample in &series.samples {
                if sample.dt_s <= 0.0 {
                    continue;
                }
                if let Some(hr) = sample.heart_rate {
                    hr_seconds += hr * sample.dt_s;
                    covered_s += sample.dt_s;
                }
            }
            let mean_hr = if covered_s > 0.0 {
                hr_seconds / covered_s
            } else {
                zones.resting_hr_bpm
            };
            let intensity = ((mean_hr - zones.resting_hr_bpm) / reserve).clamp(0.0, 1.0);
            let duration_min = series.total_duration_s() / 60.0;
            intensity * duration_min * config.epoc_rate_per_min * elevation_factor
        }
    };

    let epoc_adjusted = match profile.weight_kg {
        Some(weight) => epoc_raw * (weight / te::REFERENCE_WEIGHT_KG),
        None => epoc_raw,
    };

    // ratio 0 when the threshold is unusable keeps the curve NaN-free
    let ratio = if config.epoc_te_threshold > 0.0 {
        epoc_adjusted / config.epoc_te_threshold
    } else {
        0.0
    };
    let training_effect =
        (1.0 + ratio.powf(config.te_exponent)).clamp(te::TE_FLOOR, te::TE_CEILING);

    TrainingEffectResult {
        epoc_raw,
        epoc_adjusted,
        training_effect,
        elevation_factor,
    }
}

/// Climb factor in [1.1, 1.25] scaled by total gain, 1.0 without elevation
fn elevation_factor(series: &NormalizedSeries, config: &TrainingEffectConfig) -> f64 {
    match series.elevation_gain_m() {
        Some(gain) => {
            let scaled = if config.elevation_gain_ref_m > 0.0 {
                (gain / config.elevation_gain_ref_m).min(1.0)
            } else {
                1.0
            };
            te::ELEVATION_FACTOR_BASE + te::ELEVATION_FACTOR_SPAN * scaled
        }
        None => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NormalizerConfig, ZoneConfig};
    use crate::models::{ActivityRecord, ActivityType, Sample};
    use chrono::Utc;

    /// Constant-HR series: `minutes` one-minute intervals, optional climb
    fn series(minutes: usize, heart_rate: Option<f64>, elevation_gain: Option<f64>) -> NormalizedSeries {
        let samples: Vec<Sample> = (0..=minutes)
            .map(|i| {
                let mut s = Sample::at(i as f64 * 60.0, i as f64 * 150.0);
                s.heart_rate = heart_rate;
                if let Some(gain) = elevation_gain {
                    s.elevation_m = Some(100.0 + gain * i as f64 / minutes as f64);
                }
                s
            })
            .collect();
        let record = ActivityRecord {
            id: "test".to_string(),
            name: "TE Test".to_string(),
            activity_type: ActivityType::Running,
            start_time: Utc::now(),
            samples,
        };
        NormalizedSeries::build(&record, &NormalizerConfig::default()).unwrap()
    }

    fn profile() -> AthleteProfile {
        AthleteProfile {
            max_hr: Some(190.0),
            resting_hr: Some(50.0),
            ..AthleteProfile::default()
        }
    }

    fn zones_for(series: &NormalizedSeries) -> ZoneDistribution {
        ZoneDistribution::from_series(series, &profile(), &ZoneConfig::default()).unwrap()
    }

    #[test]
    fn test_hr_reserve_epoc_closed_form() {
        // 30 min at HR 148: intensity (148-50)/140 = 0.7
        // EPOC = 0.7 * 30 * 0.2 = 4.2, TE = 1 + (4.2/6)^0.8
        let s = series(30, Some(148.0), None);
        let result = compute(&s, &zones_for(&s), &profile(), &TrainingEffectConfig::default());

        assert!((result.epoc_raw - 4.2).abs() < 1e-9);
        assert_eq!(result.epoc_adjusted, result.epoc_raw);
        assert_eq!(result.elevation_factor, 1.0);
        assert!((result.training_effect - 1.7518).abs() < 1e-3);
    }

    #[test]
    fn test_weight_adjustment_scales_epoc() {
        let s = series(30, Some(148.0), None);
        let mut heavy = profile();
        heavy.weight_kg = Some(77.0);
        let result = compute(&s, &zones_for(&s), &heavy, &TrainingEffectConfig::default());

        assert!((result.epoc_raw - 4.2).abs() < 1e-9);
        assert!((result.epoc_adjusted - 4.62).abs() < 1e-9);
        assert!((result.training_effect - 1.8113).abs() < 1e-3);
    }

    #[test]
    fn test_elevation_factor_scaling_and_cap() {
        let flat = series(30, Some(148.0), Some(0.0));
        let result = compute(&flat, &zones_for(&flat), &profile(), &TrainingEffectConfig::default());
        assert!((result.elevation_factor - 1.1).abs() < 1e-9);

        let hilly = series(30, Some(148.0), Some(250.0));
        let result = compute(&hilly, &zones_for(&hilly), &profile(), &TrainingEffectConfig::default());
        assert!((result.elevation_factor - 1.175).abs() < 1e-9);

        let alpine = series(30, Some(148.0), Some(1200.0));
        let result = compute(&alpine, &zones_for(&alpine), &profile(), &TrainingEffectConfig::default());
        assert!((result.elevation_factor - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_session_formula_counts_uncovered_time() {
        // 30 one-minute intervals, HR present on the last 15 only
        let samples: Vec<Sample> = (0..=30)
            .map(|i| {
                let mut s = Sample::at(i as f64 * 60.0, i as f64 * 150.0);
                if i > 15 {
                    s.heart_rate = Some(148.0);
                }
                s
            })
            .collect();
        let record = ActivityRecord {
            id: "test".to_string(),
            name: "TE Test".to_string(),
            activity_type: ActivityType::Running,
            start_time: Utc::now(),
            samples,
        };
        let s = NormalizedSeries::build(&record, &NormalizerConfig::default()).unwrap();
        let zones = zones_for(&s);

        let reserve_config = TrainingEffectConfig::default();
        let session_config = TrainingEffectConfig {
            epoc_formula: EpocFormula::Session,
            ..TrainingEffectConfig::default()
        };

        let reserve = compute(&s, &zones, &profile(), &reserve_config);
        let session = compute(&s, &zones, &profile(), &session_config);

        // integral over 15 covered minutes: 0.7 * 15 * 0.2 = 2.1
        assert!((reserve.epoc_raw - 2.1).abs() < 1e-9);
        // session formula spreads the mean intensity over all 30 minutes
        assert!((session.epoc_raw - 4.2).abs() < 1e-9);
    }

    #[test]
    fn test_formulas_agree_for_constant_fully_covered_series() {
        let s = series(30, Some(148.0), None);
        let zones = zones_for(&s);
        let session_config = TrainingEffectConfig {
            epoc_formula: EpocFormula::Session,
            ..TrainingEffectConfig::default()
        };

        let reserve = compute(&s, &zones, &profile(), &TrainingEffectConfig::default());
        let session = compute(&s, &zones, &profile(), &session_config);
        assert!((reserve.epoc_raw - session.epoc_raw).abs() < 1e-9);
    }

    #[test]
    fn test_training_effect_ceiling() {
        // 10 hours at max HR saturates the curve well past 5.0
        let s = series(600, Some(195.0), None);
        let result = compute(&s, &zones_for(&s), &profile(), &TrainingEffectConfig::default());
        assert_eq!(result.training_effect, 5.0);
    }

    #[test]
    fn test_training_effect_floor_at_resting_intensity() {
        let s = series(30, Some(50.0), None);
        let result = compute(&s, &zones_for(&s), &profile(), &TrainingEffectConfig::default());
        assert_eq!(result.epoc_raw, 0.0);
        assert_eq!(result.training_effect, 1.0);
    }

    #[test]
    fn test_intensity_clamped_above_max_hr() {
        // HR above max counts as intensity 1.0, not more
        let over = series(30, Some(250.0), None);
        let at_max = series(30, Some(190.0), None);
        let over_result =
            compute(&over, &zones_for(&over), &profile(), &TrainingEffectConfig::default());
        let max_result =
            compute(&at_max, &zones_for(&at_max), &profile(), &TrainingEffectConfig::default());
        assert!((over_result.epoc_raw - max_result.epoc_raw).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_threshold_never_produces_nan() {
        let s = series(30, Some(148.0), None);
        let config = TrainingEffectConfig {
            epoc_te_threshold: 0.0,
            ..TrainingEffectConfig::default()
        };
        let result = compute(&s, &zones_for(&s), &profile(), &config);
        assert!(result.training_effect.is_finite());
        assert_eq!(result.training_effect, 1.0);
    }

    #[test]
    fn test_formula_serde_names() {
        assert_eq!(
            serde_json::to_string(&EpocFormula::HrReserve).unwrap(),
            "\"hr_reserve\""
        );
        let parsed: EpocFormula = serde_json::from_str("\"session\"").unwrap();
        assert_eq!(parsed, EpocFormula::Session);
        assert_eq!(EpocFormula::default(), EpocFormula::HrReserve);
    }
}
