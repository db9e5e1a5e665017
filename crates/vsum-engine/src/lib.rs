//! Summary aggregation engine.
//!
//! Given the frame analysis records of one video, produce a curated, ranked
//! summary of who appears in it (faces) and what it is about (keywords):
//!
//! 1. [`OccurrenceCollector`] buckets detections by identity/label.
//! 2. [`RankedFilter`] applies the occurrence and score thresholds, keeps
//!    each survivor's best occurrence, ranks by score, and caps the output.
//! 3. [`SummaryBuilder`] drives the pipeline against a [`SummarySource`]
//!    and assembles the [`VideoSummary`](vsum_models::VideoSummary).
//!
//! The engine is pure and synchronous apart from the source fetches:
//! identical records and thresholds always produce the identical summary,
//! including order.

pub mod builder;
pub mod collector;
pub mod error;
pub mod filter;

pub use builder::{SummaryBuilder, SummarySource};
pub use collector::{OccurrenceCollector, OccurrenceGroups};
pub use error::{SummaryError, UpstreamError};
pub use filter::{RankedEntry, RankedFilter};
