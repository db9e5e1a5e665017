//! Threshold configuration for summary ranking.
//!
//! A `ThresholdConfig` tunes which occurrence groups survive filtering and
//! how many entries a summary section may hold. The three count/score knobs
//! interact: a group must first clear `min_occurrence`, then hold at least
//! `min_score_occurrence` occurrences scoring `min_score` or better.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid threshold combination, detected before any records are processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdError {
    #[error("min_occurrence must be at least 1")]
    MinOccurrenceZero,

    #[error("min_score_occurrence must be at least 1")]
    MinScoreOccurrenceZero,

    #[error("min_score_occurrence ({min_score_occurrence}) cannot exceed min_occurrence ({min_occurrence})")]
    MinScoreOccurrenceTooLarge {
        min_score_occurrence: u32,
        min_occurrence: u32,
    },
}

/// Tunable thresholds for one summary section (faces or keywords).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ThresholdConfig {
    /// Minimum number of occurrences a key needs to be considered at all
    pub min_occurrence: u32,

    /// Score an occurrence must reach to count as high-confidence
    pub min_score: f32,

    /// Minimum number of high-confidence occurrences a key needs to survive
    pub min_score_occurrence: u32,

    /// Maximum number of entries in the ranked output; `None` = unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

impl ThresholdConfig {
    /// Create a threshold set. Call [`validate`](Self::validate) before use.
    pub fn new(
        min_occurrence: u32,
        min_score: f32,
        min_score_occurrence: u32,
        max_entries: Option<usize>,
    ) -> Self {
        Self {
            min_occurrence,
            min_score,
            min_score_occurrence,
            max_entries,
        }
    }

    /// Production defaults for the faces section: a person must appear in at
    /// least 3 frames, 2 of them recognized at 0.85 or better; no cap.
    pub fn default_faces() -> Self {
        Self::new(3, 0.85, 2, None)
    }

    /// Production defaults for the keywords section: a label must appear in
    /// at least 5 frames, one of them at 0.70 or better; top 5 kept.
    pub fn default_keywords() -> Self {
        Self::new(5, 0.70, 1, Some(5))
    }

    /// Check the count thresholds for consistency.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if self.min_occurrence == 0 {
            return Err(ThresholdError::MinOccurrenceZero);
        }
        if self.min_score_occurrence == 0 {
            return Err(ThresholdError::MinScoreOccurrenceZero);
        }
        if self.min_score_occurrence > self.min_occurrence {
            return Err(ThresholdError::MinScoreOccurrenceTooLarge {
                min_score_occurrence: self.min_score_occurrence,
                min_occurrence: self.min_occurrence,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sets_are_valid() {
        assert!(ThresholdConfig::default_faces().validate().is_ok());
        assert!(ThresholdConfig::default_keywords().validate().is_ok());
    }

    #[test]
    fn test_zero_min_occurrence_rejected() {
        let config = ThresholdConfig::new(0, 0.5, 1, None);
        assert_eq!(config.validate(), Err(ThresholdError::MinOccurrenceZero));
    }

    #[test]
    fn test_zero_min_score_occurrence_rejected() {
        let config = ThresholdConfig::new(3, 0.5, 0, None);
        assert_eq!(config.validate(), Err(ThresholdError::MinScoreOccurrenceZero));
    }

    #[test]
    fn test_min_score_occurrence_exceeding_min_occurrence_rejected() {
        let config = ThresholdConfig::new(2, 0.5, 3, None);
        assert_eq!(
            config.validate(),
            Err(ThresholdError::MinScoreOccurrenceTooLarge {
                min_score_occurrence: 3,
                min_occurrence: 2,
            })
        );
    }

    #[test]
    fn test_equal_count_thresholds_accepted() {
        let config = ThresholdConfig::new(3, 0.5, 3, Some(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_omits_absent_cap() {
        let json = serde_json::to_string(&ThresholdConfig::default_faces()).expect("serialize");
        assert!(!json.contains("max_entries"));

        let json = serde_json::to_string(&ThresholdConfig::default_keywords()).expect("serialize");
        assert!(json.contains("\"max_entries\":5"));
    }
}
