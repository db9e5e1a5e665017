//! Engine error types.

use thiserror::Error;
use vsum_models::{ThresholdError, VideoId};

/// Failure reported by a [`SummarySource`](crate::builder::SummarySource)
/// collaborator. The engine forwards the wrapped error unmodified; it never
/// retries and never builds a partial summary over one.
#[derive(Debug, Error)]
#[error("summary source error: {inner}")]
pub struct UpstreamError {
    inner: Box<dyn std::error::Error + Send + Sync>,
}

impl UpstreamError {
    /// Wrap a collaborator error.
    pub fn new(inner: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            inner: inner.into(),
        }
    }

    /// Take back the wrapped error.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.inner
    }
}

/// Errors from summary building.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// A threshold set failed validation; nothing was fetched or processed.
    #[error(transparent)]
    Config(#[from] ThresholdError),

    /// The requested video does not exist.
    #[error("video not found: {0}")]
    NotFound(VideoId),

    /// A collaborator fetch failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_passes_through() {
        let err = UpstreamError::new("connection refused");
        assert_eq!(err.to_string(), "summary source error: connection refused");
    }

    #[test]
    fn test_threshold_error_converts() {
        let err: SummaryError = ThresholdError::MinOccurrenceZero.into();
        assert!(matches!(err, SummaryError::Config(_)));
        assert_eq!(err.to_string(), "min_occurrence must be at least 1");
    }
}
