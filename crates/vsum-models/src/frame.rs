//! Frame analysis models.
//!
//! A frame record is one stored image (a frame extracted from a video, or a
//! standalone upload) together with the detections the external analysis
//! pipeline produced for it. Records are immutable once ingested.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::video::VideoId;

/// Unique identifier for a stored frame or standalone image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FrameId(pub String);

impl FrameId {
    /// Generate a new random frame ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FrameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FrameId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FrameId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One stored image with its analysis results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameRecord {
    /// Unique frame ID
    pub frame_id: FrameId,

    /// Video this frame was extracted from; absent for standalone images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<VideoId>,

    /// Position within the video in seconds; absent for standalone images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timecode: Option<f64>,

    /// MIME type of the image
    pub content_type: String,

    /// Size of the image in bytes
    #[serde(default)]
    pub size_bytes: u64,

    /// Ingestion timestamp
    pub created_at: DateTime<Utc>,

    /// Detected faces, in detector output order
    #[serde(default)]
    pub faces: Vec<FaceDetection>,

    /// Detected keywords, in detector output order
    #[serde(default)]
    pub keywords: Vec<KeywordDetection>,
}

impl FrameRecord {
    /// Create a new frame record with no detections.
    pub fn new(frame_id: FrameId, content_type: impl Into<String>) -> Self {
        Self {
            frame_id,
            video_id: None,
            timecode: None,
            content_type: content_type.into(),
            size_bytes: 0,
            created_at: Utc::now(),
            faces: Vec::new(),
            keywords: Vec::new(),
        }
    }

    /// Attach to a video at the given timecode.
    pub fn with_video(mut self, video_id: VideoId, timecode: f64) -> Self {
        self.video_id = Some(video_id);
        self.timecode = Some(timecode);
        self
    }

    /// Set the image size.
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Add a face detection.
    pub fn add_face(&mut self, face: FaceDetection) {
        self.faces.push(face);
    }

    /// Add a keyword detection.
    pub fn add_keyword(&mut self, keyword: KeywordDetection) {
        self.keywords.push(keyword);
    }

    /// Whether this record is a standalone image rather than a video frame.
    pub fn is_standalone(&self) -> bool {
        self.video_id.is_none()
    }
}

/// Face detection result from the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FaceDetection {
    /// Recognized identity; absent when the face was detected but not recognized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,

    /// Detection confidence score (0.0-1.0)
    pub score: f32,

    /// Bounding box in normalized coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl FaceDetection {
    /// Create a new anonymous face detection.
    pub fn new(score: f32) -> Self {
        Self {
            identity: None,
            score,
            bbox: None,
        }
    }

    /// Set the recognized identity.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Set the bounding box.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Identity name, if present and non-empty.
    pub fn named_identity(&self) -> Option<&str> {
        self.identity.as_deref().filter(|name| !name.is_empty())
    }
}

/// Keyword/label detection result from the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeywordDetection {
    /// Detected label
    pub label: String,

    /// Detection confidence score (0.0-1.0)
    pub score: f32,
}

impl KeywordDetection {
    /// Create a new keyword detection.
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Normalized bounding box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct BoundingBox {
    /// X coordinate (normalized 0.0-1.0)
    pub x: f32,
    /// Y coordinate (normalized 0.0-1.0)
    pub y: f32,
    /// Width (normalized 0.0-1.0)
    pub width: f32,
    /// Height (normalized 0.0-1.0)
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create from pixel coordinates given frame dimensions.
    pub fn from_pixels(x: f32, y: f32, w: f32, h: f32, frame_w: f32, frame_h: f32) -> Self {
        Self {
            x: x / frame_w,
            y: y / frame_h,
            width: w / frame_w,
            height: h / frame_h,
        }
    }

    /// Convert to pixel coordinates given frame dimensions.
    pub fn to_pixels(&self, frame_w: f32, frame_h: f32) -> (f32, f32, f32, f32) {
        (
            self.x * frame_w,
            self.y * frame_h,
            self.width * frame_w,
            self.height * frame_h,
        )
    }

    /// Get area (normalized).
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_record_serde_roundtrip() {
        let mut frame = FrameRecord::new(FrameId::new(), "image/jpeg")
            .with_video(VideoId::from_string("vid-1"), 12.5)
            .with_size(2048);
        frame.add_face(
            FaceDetection::new(0.92)
                .with_identity("alice")
                .with_bbox(BoundingBox::new(0.2, 0.1, 0.3, 0.4)),
        );
        frame.add_keyword(KeywordDetection::new("podium", 0.81));

        let json = serde_json::to_string(&frame).expect("serialize");
        let decoded: FrameRecord = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(frame, decoded);
        assert_eq!(decoded.faces[0].identity.as_deref(), Some("alice"));
        assert_eq!(decoded.keywords[0].label, "podium");
        assert!((decoded.timecode.unwrap() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_detection_arrays_default_to_empty() {
        let json = r#"{
            "frame_id": "frame-1",
            "content_type": "image/png",
            "created_at": "2026-01-10T12:00:00Z"
        }"#;
        let decoded: FrameRecord = serde_json::from_str(json).expect("deserialize");

        assert!(decoded.faces.is_empty());
        assert!(decoded.keywords.is_empty());
        assert!(decoded.is_standalone());
        assert!(decoded.timecode.is_none());
    }

    #[test]
    fn test_named_identity_excludes_unnamed_and_empty() {
        let anonymous = FaceDetection::new(0.9);
        assert_eq!(anonymous.named_identity(), None);

        let empty = FaceDetection::new(0.9).with_identity("");
        assert_eq!(empty.named_identity(), None);

        let named = FaceDetection::new(0.9).with_identity("bob");
        assert_eq!(named.named_identity(), Some("bob"));
    }

    #[test]
    fn test_bounding_box_from_pixels() {
        let bbox = BoundingBox::from_pixels(100.0, 50.0, 200.0, 300.0, 1920.0, 1080.0);
        assert!((bbox.x - 100.0 / 1920.0).abs() < 0.0001);
        assert!((bbox.y - 50.0 / 1080.0).abs() < 0.0001);
        assert!((bbox.width - 200.0 / 1920.0).abs() < 0.0001);
        assert!((bbox.height - 300.0 / 1080.0).abs() < 0.0001);
    }
}
