//! Occurrence collection.
//!
//! First stage of the summary pipeline: walk a video's frame records in
//! stored order and bucket every usable detection under its aggregation key
//! (recognized identity for faces, label for keywords). No filtering or
//! scoring happens here.

use indexmap::IndexMap;

use vsum_models::{FaceDetection, FrameId, FrameRecord, KeywordDetection, Occurrence};

/// Occurrences bucketed by key. Key order is first-encounter order, which
/// later stages rely on for deterministic tie-breaking.
pub type OccurrenceGroups<D> = IndexMap<String, Vec<Occurrence<D>>>;

/// Buckets frame detections into occurrence groups.
pub struct OccurrenceCollector;

impl OccurrenceCollector {
    /// Collect face and keyword occurrences from a video's frame records.
    ///
    /// Faces aggregate under their recognized identity; detections without
    /// a non-empty identity are dropped. Keywords aggregate under their
    /// label unconditionally. `frame_url` decorates each occurrence with
    /// the URL serving its frame image.
    pub fn collect(
        records: &[FrameRecord],
        frame_url: impl Fn(&FrameId) -> String,
    ) -> (
        OccurrenceGroups<FaceDetection>,
        OccurrenceGroups<KeywordDetection>,
    ) {
        let mut faces: OccurrenceGroups<FaceDetection> = IndexMap::new();
        let mut keywords: OccurrenceGroups<KeywordDetection> = IndexMap::new();

        for record in records {
            let url = frame_url(&record.frame_id);

            for face in &record.faces {
                if let Some(name) = face.named_identity() {
                    faces.entry(name.to_string()).or_default().push(Occurrence::new(
                        record.frame_id.clone(),
                        url.clone(),
                        record.timecode,
                        face.clone(),
                    ));
                }
            }

            for keyword in &record.keywords {
                keywords
                    .entry(keyword.label.clone())
                    .or_default()
                    .push(Occurrence::new(
                        record.frame_id.clone(),
                        url.clone(),
                        record.timecode,
                        keyword.clone(),
                    ));
            }
        }

        (faces, keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsum_models::VideoId;

    fn test_url(frame_id: &FrameId) -> String {
        format!("http://localhost:8000/api/images/{}/media", frame_id)
    }

    fn frame(id: &str, timecode: f64) -> FrameRecord {
        FrameRecord::new(FrameId::from_string(id), "image/jpeg")
            .with_video(VideoId::from_string("vid-1"), timecode)
    }

    #[test]
    fn test_groups_keyed_by_first_encounter_order() {
        let mut f1 = frame("f1", 0.0);
        f1.add_face(FaceDetection::new(0.9).with_identity("bob"));
        f1.add_face(FaceDetection::new(0.8).with_identity("alice"));

        let mut f2 = frame("f2", 1.0);
        f2.add_face(FaceDetection::new(0.7).with_identity("alice"));
        f2.add_face(FaceDetection::new(0.6).with_identity("carol"));

        let (faces, _) = OccurrenceCollector::collect(&[f1, f2], test_url);

        let keys: Vec<&String> = faces.keys().collect();
        assert_eq!(keys, vec!["bob", "alice", "carol"]);
        assert_eq!(faces["alice"].len(), 2);
        assert_eq!(faces["bob"].len(), 1);
    }

    #[test]
    fn test_unnamed_faces_are_dropped() {
        let mut f1 = frame("f1", 0.0);
        f1.add_face(FaceDetection::new(0.99));
        f1.add_face(FaceDetection::new(0.98).with_identity(""));
        f1.add_face(FaceDetection::new(0.5).with_identity("alice"));

        let (faces, _) = OccurrenceCollector::collect(&[f1], test_url);

        assert_eq!(faces.len(), 1);
        assert_eq!(faces["alice"].len(), 1);
    }

    #[test]
    fn test_keywords_collected_unconditionally() {
        let mut f1 = frame("f1", 0.0);
        f1.add_keyword(KeywordDetection::new("podium", 0.9));
        f1.add_keyword(KeywordDetection::new("crowd", 0.1));

        let mut f2 = frame("f2", 1.0);
        f2.add_keyword(KeywordDetection::new("podium", 0.2));

        let (_, keywords) = OccurrenceCollector::collect(&[f1, f2], test_url);

        assert_eq!(keywords["podium"].len(), 2);
        assert_eq!(keywords["crowd"].len(), 1);
    }

    #[test]
    fn test_occurrences_carry_frame_context() {
        let mut f1 = frame("f1", 42.5);
        f1.add_face(FaceDetection::new(0.9).with_identity("alice"));

        let (faces, _) = OccurrenceCollector::collect(&[f1], test_url);

        let occurrence = &faces["alice"][0];
        assert_eq!(occurrence.frame_id.as_str(), "f1");
        assert_eq!(
            occurrence.frame_url,
            "http://localhost:8000/api/images/f1/media"
        );
        assert_eq!(occurrence.timecode, Some(42.5));
        assert!((occurrence.detection.score - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_input_yields_empty_groups() {
        let (faces, keywords) = OccurrenceCollector::collect(&[], test_url);
        assert!(faces.is_empty());
        assert!(keywords.is_empty());

        let no_detections = frame("f1", 0.0);
        let (faces, keywords) = OccurrenceCollector::collect(&[no_detections], test_url);
        assert!(faces.is_empty());
        assert!(keywords.is_empty());
    }
}
