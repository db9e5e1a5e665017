//! Shared data models for the VidSum backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video metadata and analysis lifecycle
//! - Frame analysis records (faces, keywords, bounding boxes)
//! - Summary payloads (occurrences, ranked sections)
//! - Threshold configuration for summary ranking

pub mod frame;
pub mod summary;
pub mod thresholds;
pub mod video;

// Re-export common types
pub use frame::{BoundingBox, FaceDetection, FrameId, FrameRecord, KeywordDetection};
pub use summary::{Occurrence, VideoSummary};
pub use thresholds::{ThresholdConfig, ThresholdError};
pub use video::{VideoId, VideoRecord, VideoStatus};
