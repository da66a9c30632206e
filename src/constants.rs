// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Physiological and model constants shared across the metric engines.
//! Tunable thresholds live in [`crate::config`]; the values here are fixed
//! parts of the published formulas and change only with a model version bump.

/// Grade-adjusted pace model constants
pub mod gap {
    /// Metabolic cost polynomial coefficients, highest degree first.
    ///
    /// `C(s) = 155.4 s^5 - 30.4 s^4 - 43.3 s^3 + 46.3 s^2 + 19.5 s + 3.6`
    /// is the published form; the engine uses the reduced fit below, valid
    /// on the clamped gradient range. `s` is the decimal gradient and the
    /// result is J/(kg*m).
    pub const METABOLIC_COEFFS: [f64; 6] = [155.4, -30.4, 5.4, 0.68, 1.94, 3.6];

    /// Metabolic cost of level running, `C(0)`, in J/(kg*m)
    pub const FLAT_COST: f64 = 3.6;

    /// Gradient clamp for running and walking, decimal.
    ///
    /// The quintic fit turns negative a little below -0.40, so the lower
    /// bound stays above that root.
    pub const FOOT_GRADE_MIN: f64 = -0.35;
    /// Upper gradient clamp for running and walking, decimal
    pub const FOOT_GRADE_MAX: f64 = 0.45;

    /// Gradient clamp for cycling, decimal
    pub const CYCLE_GRADE_MIN: f64 = -0.45;
    /// Upper gradient clamp for cycling, decimal
    pub const CYCLE_GRADE_MAX: f64 = 0.45;

    /// Linear running model: percent grade divisor in `1 + s_pct / 100`
    pub const LINEAR_FOOT_DIVISOR: f64 = 100.0;
    /// Cycling uphill: percent grade divisor in `1 + s_pct / 200`
    pub const CYCLE_UPHILL_DIVISOR: f64 = 200.0;
    /// Cycling downhill: percent grade divisor inside the cube root
    pub const CYCLE_DOWNHILL_DIVISOR: f64 = 100.0;
}

/// Heart-rate formula constants
pub mod heart_rate {
    /// Gellish max HR regression: `206.9 - 0.67 * age`
    pub const GELLISH_INTERCEPT: f64 = 206.9;
    /// Gellish max HR regression slope per year of age
    pub const GELLISH_SLOPE: f64 = 0.67;

    /// Obesity-adjusted regression: `200.0 - 0.5 * age`
    pub const OBESE_INTERCEPT: f64 = 200.0;
    /// Obesity-adjusted regression slope per year of age
    pub const OBESE_SLOPE: f64 = 0.5;
    /// BMI at or above which the obesity-adjusted regression applies
    pub const BMI_OBESITY_THRESHOLD: f64 = 30.0;

    /// Classic max HR estimate: `220 - age`
    pub const CLASSIC_INTERCEPT: f64 = 220.0;

    /// Resting heart rate assumed when the profile does not provide one, bpm
    pub const DEFAULT_RESTING_HR: f64 = 60.0;

    /// Default Karvonen zone bounds as fractions of heart-rate reserve
    pub const DEFAULT_ZONE_BOUNDS: [(f64, f64); 5] = [
        (0.5, 0.6),
        (0.6, 0.7),
        (0.7, 0.8),
        (0.8, 0.9),
        (0.9, 1.0),
    ];
}

/// Training-effect model constants
pub mod training_effect {
    /// Lowest reportable training effect
    pub const TE_FLOOR: f64 = 1.0;
    /// Highest reportable training effect
    pub const TE_CEILING: f64 = 5.0;

    /// Body weight the EPOC accumulation rate was calibrated at, kg
    pub const REFERENCE_WEIGHT_KG: f64 = 70.0;

    /// Elevation factor at zero climbing
    pub const ELEVATION_FACTOR_BASE: f64 = 1.1;
    /// Additional elevation factor at the reference climb and beyond
    pub const ELEVATION_FACTOR_SPAN: f64 = 0.15;
}

/// Fixed segment lengths per activity type, meters
pub mod segments {
    /// Split distance for running
    pub const RUNNING_SEGMENT_M: f64 = 1000.0;
    /// Split distance for cycling
    pub const CYCLING_SEGMENT_M: f64 = 5000.0;
    /// Split distance for walking
    pub const WALKING_SEGMENT_M: f64 = 1000.0;
}

/// Standard distances scanned for best efforts, meters
pub mod best_efforts {
    /// Running target distances, 1 km up to the marathon
    pub const RUNNING_DISTANCES_M: [f64; 5] = [1_000.0, 5_000.0, 10_000.0, 21_097.5, 42_195.0];

    /// Cycling target distances, 5 km up to 200 km
    pub const CYCLING_DISTANCES_M: [f64; 6] =
        [5_000.0, 10_000.0, 25_000.0, 50_000.0, 100_000.0, 200_000.0];

    /// Walking target distances, 1 km up to 50 km
    pub const WALKING_DISTANCES_M: [f64; 7] = [
        1_000.0, 5_000.0, 10_000.0, 15_000.0, 20_000.0, 30_000.0, 50_000.0,
    ];
}
