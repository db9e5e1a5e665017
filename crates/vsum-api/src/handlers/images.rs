//! Standalone image API handlers.
//!
//! Standalone images are frame records without a video link. The media
//! route doubles as the provenance target for summaries, so it serves
//! video-extracted frames as well; the metadata routes do not.

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use vsum_models::{FaceDetection, FrameId, FrameRecord, KeywordDetection};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Upload Image
// ============================================================================

/// Optional analysis part of an image upload.
#[derive(Debug, Default, Deserialize)]
pub struct ImageAnalysisRequest {
    /// Caller-supplied frame id; generated when absent.
    #[serde(default)]
    pub frame_id: Option<String>,
    #[serde(default)]
    pub faces: Vec<FaceDetection>,
    #[serde(default)]
    pub keywords: Vec<KeywordDetection>,
}

/// Upload a standalone image.
///
/// Multipart form: the image bytes in `file`, plus an optional `analysis`
/// JSON part with pre-computed detections.
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<FrameRecord>)> {
    let mut analysis: Option<ImageAnalysisRequest> = None;
    let mut file: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "analysis" => {
                let text = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Unreadable 'analysis' part: {}", e))
                })?;
                let parsed = serde_json::from_str(&text)
                    .map_err(|e| ApiError::bad_request(format!("Invalid 'analysis' JSON: {}", e)))?;
                analysis = Some(parsed);
            }
            "file" => {
                let content_type = field.content_type().map(|ct| ct.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Unreadable 'file' part: {}", e)))?;
                file = Some((content_type, data.to_vec()));
            }
            _ => {} // ignore unknown fields
        }
    }

    let analysis = analysis.unwrap_or_default();
    let (content_type, data) =
        file.ok_or_else(|| ApiError::bad_request("Missing required 'file' field"))?;

    if data.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let frame_id = match analysis.frame_id.as_deref().map(str::trim) {
        Some("") => return Err(ApiError::bad_request("Frame id cannot be empty")),
        Some(id) => FrameId::from_string(id),
        None => FrameId::new(),
    };
    let content_type = content_type.unwrap_or_else(|| "image/jpeg".to_string());

    let mut record = FrameRecord::new(frame_id, content_type);
    for face in analysis.faces {
        record.add_face(face);
    }
    for keyword in analysis.keywords {
        record.add_keyword(keyword);
    }

    let record = state.library.upload_image(record, data).await?;

    info!(
        user_id = %user.uid,
        frame_id = %record.frame_id,
        faces = record.faces.len(),
        keywords = record.keywords.len(),
        "Image uploaded"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

// ============================================================================
// List / Get Images
// ============================================================================

/// Pagination query for image listings.
#[derive(Debug, Deserialize)]
pub struct ListImagesQuery {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub bookmark: Option<String>,
}

/// Image listing response.
#[derive(Serialize)]
pub struct ListImagesResponse {
    pub count: usize,
    pub images: Vec<FrameRecord>,
    /// Continuation token; pass back as `bookmark` to fetch the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
}

/// List standalone images, newest first.
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ListImagesQuery>,
    _user: AuthUser,
) -> ApiResult<Json<ListImagesResponse>> {
    let page = state.frames.list_standalone(query.limit, query.bookmark).await?;
    Ok(Json(ListImagesResponse {
        count: page.frames.len(),
        images: page.frames,
        bookmark: page.bookmark,
    }))
}

/// Fetch one standalone image's record.
pub async fn get_image(
    State(state): State<AppState>,
    Path(frame_id): Path<String>,
    _user: AuthUser,
) -> ApiResult<Json<FrameRecord>> {
    let frame_id = FrameId::from_string(frame_id);

    match state.frames.get(&frame_id).await? {
        Some(record) if record.is_standalone() => Ok(Json(record)),
        _ => Err(ApiError::not_found(format!("Image not found: {}", frame_id))),
    }
}

// ============================================================================
// Delete Image
// ============================================================================

/// Delete image response.
#[derive(Serialize)]
pub struct DeleteImageResponse {
    pub success: bool,
    pub frame_id: String,
}

/// Delete a standalone image and its media.
pub async fn delete_image(
    State(state): State<AppState>,
    Path(frame_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<DeleteImageResponse>> {
    let frame_id = FrameId::from_string(frame_id);
    state.library.delete_image(&frame_id).await?;

    info!(user_id = %user.uid, frame_id = %frame_id, "Image deleted");

    Ok(Json(DeleteImageResponse {
        success: true,
        frame_id: frame_id.to_string(),
    }))
}

// ============================================================================
// Image Media
// ============================================================================

/// Serve a frame image.
///
/// Public by unguessable id: this is the URL summaries hand out for
/// occurrence provenance, loaded from `<img>` tags that cannot attach
/// Authorization headers. Serves video frames and standalone images alike.
pub async fn image_media(
    State(state): State<AppState>,
    Path(frame_id): Path<String>,
) -> Result<Response, ApiError> {
    let frame_id = FrameId::from_string(frame_id);

    let record = state
        .frames
        .get(&frame_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Image not found: {}", frame_id)))?;

    let bytes = state.store.frame_media(&frame_id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, record.content_type.as_str())
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .header("Cross-Origin-Resource-Policy", "cross-origin")
        .body(Body::from(bytes))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
}
