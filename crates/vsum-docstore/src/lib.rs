//! CouchDB document store client.
//!
//! This crate provides:
//! - Typed repositories for videos and frames
//! - Mango query helpers with bookmark pagination
//! - Database and index bootstrap
//! - Optimistic concurrency via `_rev` with conflict retry
//! - Retry logic with exponential backoff and jitter

pub mod client;
pub mod error;
pub mod frames;
pub mod metrics;
pub mod retry;
pub mod sorting;
pub mod types;
pub mod videos;

pub use client::{DocStoreClient, DocStoreConfig};
pub use error::{DocStoreError, DocStoreResult};
pub use frames::{FramePage, FrameRepository};
pub use retry::{with_retry, RetryConfig};
pub use types::{DatabaseInfo, FindRequest, FindResponse, Stored, WriteAck};
pub use videos::{VideoPage, VideoRepository};
