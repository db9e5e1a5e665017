//! Summary payload types.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::frame::{FaceDetection, FrameId, KeywordDetection};
use crate::video::VideoRecord;

/// One appearance of a detection in one frame.
///
/// `frame_url` is derived from the request context when the summary is
/// built; it is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Occurrence<D> {
    /// Frame the detection was found in
    pub frame_id: FrameId,

    /// URL serving the frame image
    pub frame_url: String,

    /// Position within the video in seconds; absent for standalone images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timecode: Option<f64>,

    /// The detection itself
    pub detection: D,
}

impl<D> Occurrence<D> {
    /// Create a new occurrence.
    pub fn new(frame_id: FrameId, frame_url: impl Into<String>, timecode: Option<f64>, detection: D) -> Self {
        Self {
            frame_id,
            frame_url: frame_url.into(),
            timecode,
            detection,
        }
    }
}

/// Curated summary of a video: who appears in it and what it is about.
///
/// Map keys are in rank order (retained score descending). Each value is a
/// singleton list holding the best-scoring occurrence for that key; the list
/// form leaves room to return more occurrences per key later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoSummary {
    /// The summarized video's metadata
    #[serde(flatten)]
    pub video: VideoRecord,

    /// Recognized identity -> best occurrence
    pub faces: IndexMap<String, Vec<Occurrence<FaceDetection>>>,

    /// Keyword label -> best occurrence
    pub keywords: IndexMap<String, Vec<Occurrence<KeywordDetection>>>,
}

impl VideoSummary {
    /// Create an empty summary for a video.
    pub fn new(video: VideoRecord) -> Self {
        Self {
            video,
            faces: IndexMap::new(),
            keywords: IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::VideoId;

    fn occurrence(frame: &str, score: f32) -> Occurrence<FaceDetection> {
        Occurrence::new(
            FrameId::from_string(frame),
            format!("https://media.example/api/images/{}/media", frame),
            Some(1.0),
            FaceDetection::new(score).with_identity("alice"),
        )
    }

    #[test]
    fn test_video_fields_flatten_into_payload() {
        let summary = VideoSummary::new(VideoRecord::new(
            VideoId::from_string("vid-1"),
            "Town hall recording",
            "video/mp4",
        ));

        let json = serde_json::to_string(&summary).expect("serialize");
        assert!(json.contains("\"video_id\":\"vid-1\""));
        assert!(json.contains("\"title\":\"Town hall recording\""));
        assert!(!json.contains("\"video\":{"));
        assert!(json.contains("\"faces\":{}"));
    }

    #[test]
    fn test_map_order_survives_roundtrip() {
        let mut summary = VideoSummary::new(VideoRecord::new(
            VideoId::from_string("vid-1"),
            "Clip",
            "video/mp4",
        ));
        summary.faces.insert("bob".to_string(), vec![occurrence("f1", 0.99)]);
        summary.faces.insert("alice".to_string(), vec![occurrence("f2", 0.91)]);

        let json = serde_json::to_string(&summary).expect("serialize");
        let decoded: VideoSummary = serde_json::from_str(&json).expect("deserialize");

        let keys: Vec<&String> = decoded.faces.keys().collect();
        assert_eq!(keys, vec!["bob", "alice"]);
    }
}
