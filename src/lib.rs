// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Paceline
//!
//! A deterministic metrics engine for endurance activities. Paceline takes a
//! recorded activity (a time series of GPS and sensor samples) plus an
//! athlete profile and derives the numbers athletes actually look at:
//! grade-adjusted pace, fixed-distance segments, heart-rate zones, training
//! effect and personal bests.
//!
//! ## Features
//!
//! - **Series normalization**: Cleans raw sample streams into a strictly
//!   ordered, monotonic series with derived speed and gradient
//! - **Grade-adjusted pace**: Linear and metabolic-cost models for running
//!   and walking, an asymmetric model for cycling
//! - **Segments**: Exact kilometer or five-kilometer splits with boundary
//!   interpolation
//! - **Heart-rate zones**: Karvonen zones from measured or estimated max HR
//! - **Training effect**: EPOC-based load on the 1.0 to 5.0 scale
//! - **Personal bests**: Fastest windows over canonical race distances
//!
//! ## Determinism
//!
//! Recomputing the same activity with the same profile and configuration
//! always produces identical output. The engine reads nothing but its
//! inputs: no clocks, no randomness, no external services. Missing athlete
//! data never fails a run; the fields that depend on it simply come back
//! absent.
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use paceline::config::MetricsConfig;
//! use paceline::models::{ActivityRecord, ActivityType, AthleteProfile, Sample};
//! use paceline::pipeline::MetricsEngine;
//!
//! fn main() -> anyhow::Result<()> {
//!     let engine = MetricsEngine::new(MetricsConfig::default());
//!
//!     let record = ActivityRecord {
//!         id: "morning-run".to_string(),
//!         name: "Morning Run".to_string(),
//!         activity_type: ActivityType::Running,
//!         start_time: Utc::now(),
//!         samples: (0..=120)
//!             .map(|i| {
//!                 let mut s = Sample::at(f64::from(i) * 5.0, f64::from(i) * 13.75);
//!                 s.heart_rate = Some(148.0);
//!                 s
//!             })
//!             .collect(),
//!     };
//!     let profile = AthleteProfile {
//!         age: Some(34),
//!         weight_kg: Some(68.0),
//!         ..AthleteProfile::default()
//!     };
//!
//!     let metrics = engine.recompute(&record, &profile)?;
//!     println!(
//!         "{}: {:.0} m in {:.0} s, training effect {:?}",
//!         metrics.activity_id,
//!         metrics.summary.total_distance_m,
//!         metrics.summary.total_duration_s,
//!         metrics.training_effect.map(|te| te.training_effect),
//!     );
//!     Ok(())
//! }
//! ```

/// Common data models for activities and athletes
pub mod models;

/// Engine configuration and its TOML loading chain
pub mod config;

/// Physiological and model constants
pub mod constants;

/// Error types for the metrics pipeline
pub mod errors;

/// The metrics computation pipeline
pub mod pipeline;

/// Production logging and structured output
pub mod logging;
