// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Core data structures consumed and produced by the metrics engine.
//! Collaborators (importers, persistence, GUI) exchange these types with the
//! engine as plain immutable data.
//!
//! ## Design Principles
//!
//! - **Source Agnostic**: a record looks the same whether it came from a
//!   watch file, a platform API, or a test fixture
//! - **Explicit Absence**: sensor fields that may be missing are `Option`,
//!   never sentinel values
//! - **Serializable**: every model round-trips through JSON
//! - **Type Safe**: the activity type is a closed enum dispatched once per
//!   run, not a string inspected inside formulas
//!
//! ## Core Models
//!
//! - [`ActivityRecord`]: one recorded activity with its raw sample series
//! - [`Sample`]: a single telemetry point
//! - [`ActivityType`]: running, cycling or walking
//! - [`AthleteProfile`]: athlete parameters for zone and training-effect
//!   derivation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{heart_rate, segments};

/// A single telemetry point within an activity
///
/// `elapsed_s` is the offset from the record's start instant; the absolute
/// timestamp of a sample is `record.start_time + elapsed_s`. `distance_m` is
/// cumulative along-track distance. All sensor channels are optional: an
/// indoor trainer has no position, a watch without a strap has no heart rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since the activity start
    pub elapsed_s: f64,
    /// Latitude in decimal degrees (if recorded)
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees (if recorded)
    pub longitude: Option<f64>,
    /// Elevation above sea level in meters (if recorded)
    pub elevation_m: Option<f64>,
    /// Cumulative distance covered at this point, in meters
    pub distance_m: f64,
    /// Heart rate in beats per minute (if recorded)
    pub heart_rate: Option<f64>,
    /// Cadence in revolutions (cycling) or strides of one foot (running,
    /// walking) per minute (if recorded)
    pub cadence: Option<f64>,
    /// Instantaneous power in watts (if recorded)
    pub power_w: Option<f64>,
}

impl Sample {
    /// Minimal sample carrying only time and cumulative distance
    pub fn at(elapsed_s: f64, distance_m: f64) -> Self {
        Self {
            elapsed_s,
            latitude: None,
            longitude: None,
            elevation_m: None,
            distance_m,
            heart_rate: None,
            cadence: None,
            power_w: None,
        }
    }
}

/// One recorded activity handed to the engine by a collaborator
///
/// Decoding from telemetry containers (TCX/FIT/GPX) happens upstream; by the
/// time a record reaches the engine it is already a canonical in-memory
/// series.
///
/// # Examples
///
/// ```rust
/// use paceline::models::{ActivityRecord, ActivityType, Sample};
/// use chrono::Utc;
///
/// let record = ActivityRecord {
///     id: "a-1042".to_string(),
///     name: "Morning Run".to_string(),
///     activity_type: ActivityType::Running,
///     start_time: Utc::now(),
///     samples: vec![Sample::at(0.0, 0.0), Sample::at(10.0, 25.0)],
/// };
/// assert_eq!(record.samples.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Unique identifier for the activity (assigned by the collaborator)
    pub id: String,
    /// Human-readable name/title of the activity
    pub name: String,
    /// Type of activity; gates pace-model branches and segment distance
    pub activity_type: ActivityType,
    /// When the activity started (UTC)
    pub start_time: DateTime<Utc>,
    /// Raw telemetry samples, nominally ordered by elapsed time
    pub samples: Vec<Sample>,
}

/// Supported activity types
///
/// A closed set: every formula in the engine has a defined branch for each
/// variant, so adding a variant is a deliberate model extension rather than
/// a silent fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// Running activity
    Running,
    /// Cycling/biking activity
    Cycling,
    /// Walking or hiking activity
    Walking,
}

impl ActivityType {
    /// Fixed split distance for this activity type, in meters
    pub fn segment_distance_m(&self) -> f64 {
        match self {
            ActivityType::Running => segments::RUNNING_SEGMENT_M,
            ActivityType::Cycling => segments::CYCLING_SEGMENT_M,
            ActivityType::Walking => segments::WALKING_SEGMENT_M,
        }
    }

    /// True for activities where cadence counts strides of one foot
    pub fn on_foot(&self) -> bool {
        matches!(self, ActivityType::Running | ActivityType::Walking)
    }

    /// Human-readable name for this activity type
    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityType::Running => "run",
            ActivityType::Cycling => "bike ride",
            ActivityType::Walking => "walk",
        }
    }
}

/// Athlete parameters consumed by the zone and training-effect engines
///
/// Supplied externally as a snapshot per computation run; the engine never
/// persists it. Every field is optional. Resolution order and fallbacks are
/// documented on the consuming engines, and a missing field degrades the
/// derived metrics rather than failing the whole computation.
///
/// # Examples
///
/// ```rust
/// use paceline::models::AthleteProfile;
///
/// let profile = AthleteProfile {
///     age: Some(40),
///     weight_kg: Some(72.5),
///     height_cm: Some(181.0),
///     resting_hr: Some(52.0),
///     max_hr: None, // derived from age
///     hr_zone_bounds: None, // configured defaults apply
/// };
/// assert!(profile.bmi().unwrap() < 30.0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AthleteProfile {
    /// Age in years
    pub age: Option<u32>,
    /// Body weight in kilograms
    pub weight_kg: Option<f64>,
    /// Height in centimeters
    pub height_cm: Option<f64>,
    /// Resting heart rate in beats per minute
    pub resting_hr: Option<f64>,
    /// Maximum heart rate in beats per minute; when absent it is derived
    /// from age per the configured formula
    pub max_hr: Option<f64>,
    /// Zone intensity bounds as five (lower, upper) fractions of heart-rate
    /// reserve; when absent the configured defaults apply
    pub hr_zone_bounds: Option<[(f64, f64); 5]>,
}

impl AthleteProfile {
    /// Body mass index, when both weight and height are known
    pub fn bmi(&self) -> Option<f64> {
        match (self.weight_kg, self.height_cm) {
            (Some(weight), Some(height)) if height > 0.0 => {
                let height_m = height / 100.0;
                Some(weight / (height_m * height_m))
            }
            _ => None,
        }
    }

    /// Resting heart rate with the standard fallback applied
    pub fn resting_hr_or_default(&self) -> f64 {
        self.resting_hr.unwrap_or(heart_rate::DEFAULT_RESTING_HR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_sample_record() -> ActivityRecord {
        ActivityRecord {
            id: "a-12345".to_string(),
            name: "Morning Run".to_string(),
            activity_type: ActivityType::Running,
            start_time: Utc::now(),
            samples: vec![
                Sample::at(0.0, 0.0),
                Sample::at(10.0, 25.0),
                Sample::at(20.0, 50.0),
            ],
        }
    }

    #[test]
    fn test_record_creation() {
        let record = create_sample_record();
        assert_eq!(record.id, "a-12345");
        assert_eq!(record.name, "Morning Run");
        assert!(matches!(record.activity_type, ActivityType::Running));
        assert_eq!(record.samples.len(), 3);
        assert_eq!(record.samples[2].distance_m, 50.0);
    }

    #[test]
    fn test_record_serialization() {
        let record = create_sample_record();

        let json = serde_json::to_string(&record).expect("Failed to serialize record");
        assert!(json.contains("Morning Run"));
        assert!(json.contains("running")); // activity_type should be snake_case

        let deserialized: ActivityRecord =
            serde_json::from_str(&json).expect("Failed to deserialize record");
        assert_eq!(deserialized.id, record.id);
        assert_eq!(deserialized.samples.len(), record.samples.len());
        assert!(matches!(deserialized.activity_type, ActivityType::Running));
    }

    #[test]
    fn test_activity_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ActivityType::Running).unwrap(),
            "\"running\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityType::Cycling).unwrap(),
            "\"cycling\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityType::Walking).unwrap(),
            "\"walking\""
        );

        let parsed: ActivityType = serde_json::from_str("\"cycling\"").unwrap();
        assert!(matches!(parsed, ActivityType::Cycling));
    }

    #[test]
    fn test_segment_distance_by_type() {
        assert_eq!(ActivityType::Running.segment_distance_m(), 1000.0);
        assert_eq!(ActivityType::Walking.segment_distance_m(), 1000.0);
        assert_eq!(ActivityType::Cycling.segment_distance_m(), 5000.0);
        assert!(ActivityType::Running.on_foot());
        assert!(ActivityType::Walking.on_foot());
        assert!(!ActivityType::Cycling.on_foot());
    }

    #[test]
    fn test_profile_bmi() {
        let profile = AthleteProfile {
            weight_kg: Some(81.0),
            height_cm: Some(180.0),
            ..AthleteProfile::default()
        };
        let bmi = profile.bmi().unwrap();
        assert!((bmi - 25.0).abs() < 1e-9);

        // Either field missing means no BMI, never an error
        let no_height = AthleteProfile {
            weight_kg: Some(81.0),
            ..AthleteProfile::default()
        };
        assert!(no_height.bmi().is_none());
        assert!(AthleteProfile::default().bmi().is_none());
    }

    #[test]
    fn test_profile_serialization() {
        let profile = AthleteProfile {
            age: Some(34),
            weight_kg: Some(65.0),
            height_cm: None,
            resting_hr: Some(48.0),
            max_hr: Some(192.0),
            hr_zone_bounds: Some([
                (0.5, 0.6),
                (0.6, 0.7),
                (0.7, 0.8),
                (0.8, 0.9),
                (0.9, 1.0),
            ]),
        };

        let json = serde_json::to_string(&profile).expect("Failed to serialize profile");
        let deserialized: AthleteProfile =
            serde_json::from_str(&json).expect("Failed to deserialize profile");

        assert_eq!(deserialized.age, Some(34));
        assert_eq!(deserialized.max_hr, Some(192.0));
        let bounds = deserialized.hr_zone_bounds.unwrap();
        assert_eq!(bounds[0], (0.5, 0.6));
        assert_eq!(bounds[4], (0.9, 1.0));
    }

    #[test]
    fn test_sample_optional_fields() {
        let sample = Sample::at(12.0, 30.5);
        assert!(sample.heart_rate.is_none());
        assert!(sample.elevation_m.is_none());

        let json = serde_json::to_string(&sample).unwrap();
        let deserialized: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.elapsed_s, 12.0);
        assert_eq!(deserialized.distance_m, 30.5);
        assert_eq!(deserialized.power_w, None);
    }
}
