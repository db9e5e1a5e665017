//! Video metadata models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a stored video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
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

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Analysis lifecycle of a stored video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Uploaded, no analysis results yet
    #[default]
    Uploaded,
    /// Analysis pipeline is running
    Analyzing,
    /// At least one frame analysis record is present
    Analyzed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploaded => "uploaded",
            VideoStatus::Analyzing => "analyzing",
            VideoStatus::Analyzed => "analyzed",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Video metadata stored in the document store.
///
/// Media bytes live in the blob store under a key derived from `video_id`;
/// this record only carries metadata and analysis bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    /// Unique video ID
    pub video_id: VideoId,

    /// Display title
    pub title: String,

    /// Optional free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// MIME type of the uploaded media
    pub content_type: String,

    /// Size of the uploaded media in bytes
    #[serde(default)]
    pub size_bytes: u64,

    /// Analysis status
    #[serde(default)]
    pub status: VideoStatus,

    /// Number of frame analysis records ingested for this video
    #[serde(default)]
    pub frame_count: u32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Create a new video record in the `uploaded` state.
    pub fn new(video_id: VideoId, title: impl Into<String>, content_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            video_id,
            title: title.into(),
            description: None,
            content_type: content_type.into(),
            size_bytes: 0,
            status: VideoStatus::Uploaded,
            frame_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the media size.
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Mark the analysis pipeline as running.
    pub fn begin_analysis(mut self) -> Self {
        self.status = VideoStatus::Analyzing;
        self.updated_at = Utc::now();
        self
    }

    /// Record ingested frame analysis results.
    pub fn record_frames(mut self, count: u32) -> Self {
        self.frame_count += count;
        self.status = VideoStatus::Analyzed;
        self.updated_at = Utc::now();
        self
    }

    /// Drop all analysis bookkeeping, returning to the `uploaded` state.
    pub fn reset_analysis(mut self) -> Self {
        self.frame_count = 0;
        self.status = VideoStatus::Uploaded;
        self.updated_at = Utc::now();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_generation() {
        let id1 = VideoId::new();
        let id2 = VideoId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_video_record_creation() {
        let id = VideoId::new();
        let record = VideoRecord::new(id.clone(), "Town hall recording", "video/mp4");

        assert_eq!(record.video_id, id);
        assert_eq!(record.status, VideoStatus::Uploaded);
        assert_eq!(record.frame_count, 0);
        assert!(record.description.is_none());
    }

    #[test]
    fn test_status_transitions() {
        let record = VideoRecord::new(VideoId::new(), "Clip", "video/mp4")
            .begin_analysis();
        assert_eq!(record.status, VideoStatus::Analyzing);

        let record = record.record_frames(3).record_frames(2);
        assert_eq!(record.status, VideoStatus::Analyzed);
        assert_eq!(record.frame_count, 5);

        let record = record.reset_analysis();
        assert_eq!(record.status, VideoStatus::Uploaded);
        assert_eq!(record.frame_count, 0);
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&VideoStatus::Analyzed).expect("serialize");
        assert_eq!(json, "\"analyzed\"");

        let decoded: VideoStatus = serde_json::from_str("\"analyzing\"").expect("deserialize");
        assert_eq!(decoded, VideoStatus::Analyzing);
    }
}
