//! Error types for CouchDB operations.

use thiserror::Error;

/// Result alias for document store operations.
pub type DocStoreResult<T> = Result<T, DocStoreError>;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum DocStoreError {
    /// Document not found.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Revision conflict on write.
    #[error("Revision conflict: {0}")]
    Conflict(String),

    /// Credentials rejected by the server.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request failed with a non-retryable status.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Server returned a 5xx status.
    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    /// Server asked us to back off.
    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    /// Network-level failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocStoreError {
    /// Create a not-found error.
    pub fn not_found(doc_id: impl Into<String>) -> Self {
        Self::NotFound(doc_id.into())
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a request-failed error.
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    /// Create an invalid-response error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map an HTTP status code to the matching error variant.
    pub fn from_http_status(status: u16, context: impl Into<String>) -> Self {
        let context = context.into();
        match status {
            401 | 403 => Self::Unauthorized(context),
            404 => Self::NotFound(context),
            409 | 412 => Self::Conflict(context),
            429 => Self::RateLimited(1000),
            500..=599 => Self::ServerError(status, context),
            _ => Self::RequestFailed(context),
        }
    }

    /// Whether a retry could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited(_) | Self::ServerError(_, _)
        )
    }

    /// Server-requested backoff, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }

    /// The HTTP status this error corresponds to, if known.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::Unauthorized(_) => Some(401),
            Self::RateLimited(_) => Some(429),
            Self::ServerError(status, _) => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_mapping() {
        assert!(matches!(
            DocStoreError::from_http_status(404, "missing"),
            DocStoreError::NotFound(_)
        ));
        assert!(matches!(
            DocStoreError::from_http_status(409, "rev mismatch"),
            DocStoreError::Conflict(_)
        ));
        assert!(matches!(
            DocStoreError::from_http_status(412, "db exists"),
            DocStoreError::Conflict(_)
        ));
        assert!(matches!(
            DocStoreError::from_http_status(401, "bad creds"),
            DocStoreError::Unauthorized(_)
        ));
        assert!(matches!(
            DocStoreError::from_http_status(429, "slow down"),
            DocStoreError::RateLimited(_)
        ));
        assert!(matches!(
            DocStoreError::from_http_status(503, "unavailable"),
            DocStoreError::ServerError(503, _)
        ));
        assert!(matches!(
            DocStoreError::from_http_status(400, "bad selector"),
            DocStoreError::RequestFailed(_)
        ));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(DocStoreError::RateLimited(500).is_retryable());
        assert!(DocStoreError::ServerError(502, "bad gateway".into()).is_retryable());
        assert!(!DocStoreError::NotFound("gone".into()).is_retryable());
        assert!(!DocStoreError::Conflict("rev".into()).is_retryable());
        assert!(!DocStoreError::Unauthorized("denied".into()).is_retryable());
        assert!(!DocStoreError::Config("missing var".into()).is_retryable());
    }

    #[test]
    fn test_retry_after_only_on_rate_limit() {
        assert_eq!(DocStoreError::RateLimited(2500).retry_after_ms(), Some(2500));
        assert_eq!(
            DocStoreError::ServerError(500, "boom".into()).retry_after_ms(),
            None
        );
    }

    #[test]
    fn test_http_status_roundtrip() {
        assert_eq!(DocStoreError::NotFound("x".into()).http_status(), Some(404));
        assert_eq!(DocStoreError::Conflict("x".into()).http_status(), Some(409));
        assert_eq!(
            DocStoreError::ServerError(502, "x".into()).http_status(),
            Some(502)
        );
        assert_eq!(DocStoreError::Config("x".into()).http_status(), None);
    }
}
