// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Engine configuration for normalization, pace models and derived metrics
//!
//! Every knob has a default matching the published model parameters, so an
//! empty or partial TOML file is valid. Formula selectors live next to their
//! engines and are re-exported here through the config tree.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::heart_rate;
use crate::models::ActivityType;
use crate::pipeline::pace::GapFormula;
use crate::pipeline::training_effect::EpocFormula;
use crate::pipeline::zones::MaxHrFormula;

/// Main engine configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub normalizer: NormalizerConfig,
    pub pace: PaceConfig,
    pub zones: ZoneConfig,
    pub training_effect: TrainingEffectConfig,
    pub pace_bands: PaceBandsConfig,
}

/// Series cleaning thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Cumulative distance may dip by up to this many meters before the
    /// series is rejected as malformed; smaller dips are clamped flat
    pub distance_noise_tolerance_m: f64,
    /// Samples closer together than this are merged, seconds
    pub min_time_delta_s: f64,
    /// Below this horizontal movement the gradient is treated as zero, meters
    pub min_horizontal_delta_m: f64,
    /// Sample gaps longer than this are flagged as pauses, seconds
    pub pause_gap_threshold_s: f64,
}

/// Grade-adjusted pace configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceConfig {
    /// Which flat-equivalent speed model to apply to running and walking
    pub gap_formula: GapFormula,
}

/// Heart-rate zone configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Age-based max HR estimate used when the profile has no explicit value
    pub max_hr_formula: MaxHrFormula,
    /// Resting HR assumed when the profile has none, bpm
    pub default_resting_hr: f64,
    /// Zone bounds as five (lower, upper) fractions of heart-rate reserve,
    /// applied when the profile carries no custom bounds
    pub zone_bounds: [(f64, f64); 5],
}

/// EPOC and training-effect configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingEffectConfig {
    /// How intensity samples are aggregated into EPOC
    pub epoc_formula: EpocFormula,
    /// EPOC accumulated per minute at full intensity, at reference weight
    pub epoc_rate_per_min: f64,
    /// Adjusted EPOC that maps to one unit above the training-effect floor
    pub epoc_te_threshold: f64,
    /// Exponent of the EPOC-to-training-effect curve
    pub te_exponent: f64,
    /// Elevation gain at which the climbing factor saturates, meters
    pub elevation_gain_ref_m: f64,
}

/// Plausible pace ranges per activity type
///
/// Intervals whose pace falls outside the band are excluded from summary
/// pace statistics. The bands are deliberately wide; they reject GPS
/// artifacts, not slow athletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceBandsConfig {
    pub running: PaceBand,
    pub cycling: PaceBand,
    pub walking: PaceBand,
}

/// A plausible pace interval in minutes per kilometer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaceBand {
    pub min_pace_min_per_km: f64,
    pub max_pace_min_per_km: f64,
}

impl MetricsConfig {
    /// Load engine configuration from file or use defaults
    pub fn load(path: Option<String>) -> Result<Self> {
        // Try explicit path first
        if let Some(config_path) = path {
            return Self::load_from_file(&config_path);
        }

        // Try a config file in the working directory
        if Path::new("paceline.toml").exists() {
            return Self::load_from_file("paceline.toml");
        }

        // Try the per-user config location
        if let Some(user_path) = dirs::config_dir().map(|p| p.join("paceline/config.toml")) {
            if user_path.exists() {
                return Self::load_from_file(&user_path.to_string_lossy());
            }
        }

        // Fall back to embedded defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config file: {path}"))?;

        let config: MetricsConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse engine config file: {path}"))?;

        Ok(config)
    }
}

impl PaceBandsConfig {
    /// The plausibility band for an activity type
    pub fn band_for(&self, activity_type: ActivityType) -> PaceBand {
        match activity_type {
            ActivityType::Running => self.running,
            ActivityType::Cycling => self.cycling,
            ActivityType::Walking => self.walking,
        }
    }
}

impl PaceBand {
    /// Whether a speed in m/s falls inside this pace band
    pub fn contains_speed(&self, speed_mps: f64) -> bool {
        if speed_mps <= 0.0 {
            return false;
        }
        let pace_min_per_km = 1000.0 / speed_mps / 60.0;
        pace_min_per_km >= self.min_pace_min_per_km && pace_min_per_km <= self.max_pace_min_per_km
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            distance_noise_tolerance_m: 1.0,
            min_time_delta_s: 0.1,
            min_horizontal_delta_m: 0.5,
            pause_gap_threshold_s: 10.0,
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            max_hr_formula: MaxHrFormula::default(),
            default_resting_hr: heart_rate::DEFAULT_RESTING_HR,
            zone_bounds: heart_rate::DEFAULT_ZONE_BOUNDS,
        }
    }
}

impl Default for TrainingEffectConfig {
    fn default() -> Self {
        Self {
            epoc_formula: EpocFormula::default(),
            epoc_rate_per_min: 0.2,
            epoc_te_threshold: 6.0,
            te_exponent: 0.8,
            elevation_gain_ref_m: 500.0,
        }
    }
}

impl Default for PaceBandsConfig {
    fn default() -> Self {
        Self {
            running: PaceBand {
                min_pace_min_per_km: 3.0,
                max_pace_min_per_km: 12.0,
            },
            cycling: PaceBand {
                min_pace_min_per_km: 0.5,
                max_pace_min_per_km: 6.0,
            },
            walking: PaceBand {
                min_pace_min_per_km: 8.0,
                max_pace_min_per_km: 25.0,
            },
        }
    }
}
