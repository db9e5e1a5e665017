//! S3-compatible media storage client.
//!
//! This crate provides:
//! - Byte upload/download against any S3 API (MinIO, R2, AWS)
//! - Ranged reads for media streaming
//! - Presigned URL generation
//! - Prefix deletion for cascading cleanup
//! - Object key layout for video and frame media

pub mod client;
pub mod error;
pub mod keys;
pub mod operations;

pub use client::{MediaStore, MediaStoreConfig, ObjectInfo};
pub use error::{StorageError, StorageResult};
pub use keys::{frame_key, video_prefix, video_source_key};
