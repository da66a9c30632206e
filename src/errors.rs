// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error taxonomy for metric computation

/// Errors surfaced by the metrics pipeline
///
/// `MalformedSeries` is fatal for the whole activity. `InsufficientAthleteData`
/// is fatal only for the heart-rate zone and training-effect stages; the entry
/// point degrades those to absent fields and still returns segment, summary
/// and personal-best results.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Malformed activity series: {0}")]
    MalformedSeries(String),

    #[error("Insufficient athlete data: {0}")]
    InsufficientAthleteData(String),
}

impl MetricsError {
    /// True when the error only blocks heart-rate-derived metrics
    pub fn is_partial(&self) -> bool {
        matches!(self, MetricsError::InsufficientAthleteData(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = MetricsError::MalformedSeries("fewer than 2 usable samples".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed activity series: fewer than 2 usable samples"
        );

        let err = MetricsError::InsufficientAthleteData("no max heart rate".to_string());
        assert_eq!(err.to_string(), "Insufficient athlete data: no max heart rate");
    }

    #[test]
    fn test_partial_classification() {
        assert!(MetricsError::InsufficientAthleteData(String::new()).is_partial());
        assert!(!MetricsError::MalformedSeries(String::new()).is_partial());
    }
}
