//! Ranked filtering of occurrence groups.
//!
//! Second stage of the summary pipeline: apply a [`ThresholdConfig`] to the
//! collected groups and produce the ranked survivors. Filtering reads the
//! groups without mutating them; ranking is deterministic given group
//! insertion order.

use std::cmp::Ordering;

use vsum_models::{Occurrence, ThresholdConfig, ThresholdError};

use crate::collector::OccurrenceGroups;

/// One surviving key with the occurrence that represents it.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry<D> {
    /// Aggregation key (identity or label)
    pub key: String,
    /// The group's best-scoring occurrence
    pub best: Occurrence<D>,
}

/// Filters occurrence groups by thresholds and ranks the survivors.
pub struct RankedFilter;

impl RankedFilter {
    /// Rank occurrence groups under a threshold set.
    ///
    /// A key survives when its group holds at least `min_occurrence`
    /// occurrences, of which at least `min_score_occurrence` score
    /// `min_score` or better. Each survivor is represented by its single
    /// best-scoring occurrence; survivors are ordered by that score,
    /// descending, and capped at `max_entries` when set.
    ///
    /// Ties are deterministic: within a group the first-encountered best
    /// occurrence wins, and keys with equal best scores keep their
    /// first-encounter order.
    ///
    /// The threshold set is validated before any group is examined.
    pub fn rank<D: Clone>(
        groups: &OccurrenceGroups<D>,
        score: impl Fn(&D) -> f32,
        thresholds: &ThresholdConfig,
    ) -> Result<Vec<RankedEntry<D>>, ThresholdError> {
        thresholds.validate()?;

        let mut survivors: Vec<(RankedEntry<D>, f32)> = Vec::new();

        for (key, occurrences) in groups {
            if (occurrences.len() as u32) < thresholds.min_occurrence {
                continue;
            }

            let confident = occurrences
                .iter()
                .filter(|o| score(&o.detection) >= thresholds.min_score)
                .count();
            if (confident as u32) < thresholds.min_score_occurrence {
                continue;
            }

            // Strict `>` keeps the first-encountered occurrence on ties.
            let mut best = &occurrences[0];
            let mut best_score = score(&best.detection);
            for occurrence in &occurrences[1..] {
                let candidate = score(&occurrence.detection);
                if candidate > best_score {
                    best = occurrence;
                    best_score = candidate;
                }
            }

            survivors.push((
                RankedEntry {
                    key: key.clone(),
                    best: best.clone(),
                },
                best_score,
            ));
        }

        // Stable sort: equal scores keep the filtering pass's key order.
        survivors.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        if let Some(cap) = thresholds.max_entries {
            survivors.truncate(cap);
        }

        Ok(survivors.into_iter().map(|(entry, _)| entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use vsum_models::{FaceDetection, FrameId};

    fn occurrence(frame: &str, score: f32) -> Occurrence<FaceDetection> {
        Occurrence::new(
            FrameId::from_string(frame),
            format!("http://localhost:8000/api/images/{}/media", frame),
            Some(0.0),
            FaceDetection::new(score).with_identity("someone"),
        )
    }

    fn group_of(scores: &[f32]) -> Vec<Occurrence<FaceDetection>> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| occurrence(&format!("f{}", i), s))
            .collect()
    }

    fn groups_from(entries: Vec<(&str, Vec<Occurrence<FaceDetection>>)>) -> OccurrenceGroups<FaceDetection> {
        let mut groups: OccurrenceGroups<FaceDetection> = IndexMap::new();
        for (key, occurrences) in entries {
            groups.insert(key.to_string(), occurrences);
        }
        groups
    }

    fn rank(
        groups: &OccurrenceGroups<FaceDetection>,
        thresholds: &ThresholdConfig,
    ) -> Vec<RankedEntry<FaceDetection>> {
        RankedFilter::rank(groups, |d| d.score, thresholds).expect("valid thresholds")
    }

    fn keys(entries: &[RankedEntry<FaceDetection>]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_group_clearing_both_thresholds_keeps_best() {
        let groups = groups_from(vec![("alice", group_of(&[0.9, 0.6, 0.95]))]);
        let thresholds = ThresholdConfig::new(3, 0.85, 2, None);

        let ranked = rank(&groups, &thresholds);

        assert_eq!(keys(&ranked), vec!["alice"]);
        assert!((ranked[0].best.detection.score - 0.95).abs() < f32::EPSILON);
        assert_eq!(ranked[0].best.frame_id.as_str(), "f2");
    }

    #[test]
    fn test_insufficient_confident_occurrences_drops_group() {
        // Same group, but three occurrences at or above 0.85 are required
        // and only two qualify.
        let groups = groups_from(vec![("alice", group_of(&[0.9, 0.6, 0.95]))]);
        let thresholds = ThresholdConfig::new(3, 0.85, 3, None);

        let ranked = rank(&groups, &thresholds);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_cap_keeps_top_scored_entry() {
        let groups = groups_from(vec![
            ("a", group_of(&[0.9])),
            ("b", group_of(&[0.99])),
            ("c", group_of(&[0.95])),
        ]);
        let thresholds = ThresholdConfig::new(1, 0.5, 1, Some(1));

        let ranked = rank(&groups, &thresholds);
        assert_eq!(keys(&ranked), vec!["b"]);
    }

    #[test]
    fn test_empty_groups_yield_empty_output() {
        let groups: OccurrenceGroups<FaceDetection> = IndexMap::new();
        let thresholds = ThresholdConfig::default_faces();

        let ranked = rank(&groups, &thresholds);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_invalid_thresholds_fail_before_processing() {
        let groups = groups_from(vec![("alice", group_of(&[0.9]))]);
        let thresholds = ThresholdConfig::new(0, 0.5, 1, None);

        let result = RankedFilter::rank(&groups, |d| d.score, &thresholds);
        assert_eq!(result, Err(ThresholdError::MinOccurrenceZero));
    }

    #[test]
    fn test_survivors_sorted_by_score_descending() {
        let groups = groups_from(vec![
            ("low", group_of(&[0.6])),
            ("high", group_of(&[0.99])),
            ("mid", group_of(&[0.8])),
        ]);
        let thresholds = ThresholdConfig::new(1, 0.5, 1, None);

        let ranked = rank(&groups, &thresholds);
        assert_eq!(keys(&ranked), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_equal_best_scores_keep_insertion_order() {
        let groups = groups_from(vec![
            ("first", group_of(&[0.9])),
            ("second", group_of(&[0.9])),
            ("third", group_of(&[0.9])),
        ]);
        let thresholds = ThresholdConfig::new(1, 0.5, 1, None);

        let ranked = rank(&groups, &thresholds);
        assert_eq!(keys(&ranked), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_tied_best_within_group_keeps_first_encountered() {
        let groups = groups_from(vec![("alice", group_of(&[0.7, 0.9, 0.9]))]);
        let thresholds = ThresholdConfig::new(1, 0.5, 1, None);

        let ranked = rank(&groups, &thresholds);
        // f1 and f2 both score 0.9; f1 came first.
        assert_eq!(ranked[0].best.frame_id.as_str(), "f1");
    }

    #[test]
    fn test_raising_min_occurrence_only_removes_keys() {
        let groups = groups_from(vec![
            ("one", group_of(&[0.9])),
            ("two", group_of(&[0.9, 0.9])),
            ("three", group_of(&[0.9, 0.9, 0.9])),
        ]);

        let mut previous: Option<Vec<String>> = None;
        for min_occurrence in 1..=4 {
            let thresholds = ThresholdConfig::new(min_occurrence, 0.5, 1, None);
            let kept: Vec<String> = rank(&groups, &thresholds)
                .into_iter()
                .map(|e| e.key)
                .collect();

            if let Some(prev) = &previous {
                assert!(
                    kept.iter().all(|k| prev.contains(k)),
                    "raising min_occurrence to {} introduced keys: {:?} -> {:?}",
                    min_occurrence,
                    prev,
                    kept
                );
            }
            previous = Some(kept);
        }
        assert_eq!(previous.unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_raising_min_score_only_removes_keys() {
        let groups = groups_from(vec![
            ("weak", group_of(&[0.55, 0.6])),
            ("strong", group_of(&[0.95, 0.97])),
        ]);

        let mut previous: Option<Vec<String>> = None;
        for min_score in [0.5, 0.7, 0.96, 0.99] {
            let thresholds = ThresholdConfig::new(2, min_score, 1, None);
            let kept: Vec<String> = rank(&groups, &thresholds)
                .into_iter()
                .map(|e| e.key)
                .collect();

            if let Some(prev) = &previous {
                assert!(kept.iter().all(|k| prev.contains(k)));
            }
            previous = Some(kept);
        }
        assert_eq!(previous.unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_truncation_is_prefix_of_uncapped_ranking() {
        let groups = groups_from(vec![
            ("a", group_of(&[0.7])),
            ("b", group_of(&[0.95])),
            ("c", group_of(&[0.8])),
            ("d", group_of(&[0.9])),
        ]);

        let uncapped = rank(&groups, &ThresholdConfig::new(1, 0.5, 1, None));
        for cap in 0..=5 {
            let capped = rank(&groups, &ThresholdConfig::new(1, 0.5, 1, Some(cap)));
            assert_eq!(capped.len(), cap.min(uncapped.len()));
            assert_eq!(keys(&capped), keys(&uncapped)[..capped.len()].to_vec());
        }
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let groups = groups_from(vec![
            ("a", group_of(&[0.9, 0.7])),
            ("b", group_of(&[0.9, 0.95])),
            ("c", group_of(&[0.8, 0.8])),
        ]);
        let thresholds = ThresholdConfig::new(2, 0.75, 1, Some(2));

        let first = rank(&groups, &thresholds);
        let second = rank(&groups, &thresholds);
        assert_eq!(first, second);
    }

    #[test]
    fn test_groups_are_not_mutated_by_ranking() {
        let groups = groups_from(vec![
            ("kept", group_of(&[0.9, 0.9])),
            ("dropped", group_of(&[0.9])),
        ]);
        let before = groups.clone();

        let _ = rank(&groups, &ThresholdConfig::new(2, 0.5, 1, None));
        assert_eq!(groups, before);
    }
}
