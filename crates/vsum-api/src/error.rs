//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vsum_engine::SummaryError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(vsum_storage::StorageError),

    #[error("Document store error: {0}")]
    DocStore(vsum_docstore::DocStoreError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::DocStore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Document-level outcomes keep their HTTP meaning; everything else from the
/// document store is an internal failure.
impl From<vsum_docstore::DocStoreError> for ApiError {
    fn from(e: vsum_docstore::DocStoreError) -> Self {
        match e {
            vsum_docstore::DocStoreError::NotFound(msg) => ApiError::NotFound(msg),
            vsum_docstore::DocStoreError::Conflict(msg) => ApiError::Conflict(msg),
            e => ApiError::DocStore(e),
        }
    }
}

impl From<vsum_storage::StorageError> for ApiError {
    fn from(e: vsum_storage::StorageError) -> Self {
        match e {
            vsum_storage::StorageError::NotFound(_) => {
                ApiError::NotFound("Media not found".to_string())
            }
            e => ApiError::Storage(e),
        }
    }
}

impl From<SummaryError> for ApiError {
    fn from(e: SummaryError) -> Self {
        match e {
            SummaryError::NotFound(video_id) => {
                ApiError::NotFound(format!("Video not found: {}", video_id))
            }
            SummaryError::Config(e) => ApiError::Validation(e.to_string()),
            SummaryError::Upstream(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = match &self {
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::DocStore(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse { detail, code: None };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsum_models::{ThresholdError, VideoId};

    #[test]
    fn test_docstore_conflict_maps_to_409() {
        let err: ApiError = vsum_docstore::DocStoreError::conflict("rev mismatch").into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_docstore_not_found_maps_to_404() {
        let err: ApiError = vsum_docstore::DocStoreError::not_found("video:x").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_docstore_network_class_maps_to_500() {
        let err: ApiError = vsum_docstore::DocStoreError::ServerError(503, "busy".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_storage_not_found_maps_to_404() {
        let err: ApiError = vsum_storage::StorageError::not_found("frames/f-1").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_summary_errors_map_by_kind() {
        let missing: ApiError = SummaryError::NotFound(VideoId::from_string("v-1")).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let config: ApiError = SummaryError::Config(ThresholdError::MinOccurrenceZero).into();
        assert_eq!(config.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_rate_limited_maps_to_429() {
        assert_eq!(ApiError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }
}
