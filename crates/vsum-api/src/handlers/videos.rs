//! Video API handlers.

use std::time::Duration;

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use vsum_models::{FaceDetection, FrameId, FrameRecord, KeywordDetection, VideoId, VideoRecord};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Upload Video
// ============================================================================

/// Metadata part of a video upload.
#[derive(Debug, Deserialize)]
pub struct UploadVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Upload a new video.
///
/// Multipart form: a `metadata` JSON part plus the media bytes in `file`.
pub async fn upload_video(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<VideoRecord>)> {
    let mut metadata: Option<UploadVideoRequest> = None;
    let mut file: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "metadata" => {
                let text = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Unreadable 'metadata' part: {}", e))
                })?;
                let parsed = serde_json::from_str(&text)
                    .map_err(|e| ApiError::bad_request(format!("Invalid 'metadata' JSON: {}", e)))?;
                metadata = Some(parsed);
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

    let metadata =
        metadata.ok_or_else(|| ApiError::bad_request("Missing required 'metadata' field"))?;
    let (content_type, data) =
        file.ok_or_else(|| ApiError::bad_request("Missing required 'file' field"))?;

    // Validate title
    let title = metadata.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }
    if title.len() > 500 {
        return Err(ApiError::bad_request("Title too long (max 500 characters)"));
    }
    if data.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let content_type = content_type.unwrap_or_else(|| "video/mp4".to_string());

    let mut record = VideoRecord::new(VideoId::new(), title, content_type);
    if let Some(description) = metadata
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        record = record.with_description(description);
    }

    let record = state.library.upload_video(record, data).await?;

    info!(
        user_id = %user.uid,
        video_id = %record.video_id,
        size_bytes = record.size_bytes,
        "Video uploaded"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

// ============================================================================
// List / Get Videos
// ============================================================================

/// Pagination query for video listings.
#[derive(Debug, Deserialize)]
pub struct ListVideosQuery {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub bookmark: Option<String>,
}

/// Video listing response.
#[derive(Serialize)]
pub struct ListVideosResponse {
    pub count: usize,
    pub videos: Vec<VideoRecord>,
    /// Continuation token; pass back as `bookmark` to fetch the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
}

/// List videos, newest first.
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<ListVideosQuery>,
    _user: AuthUser,
) -> ApiResult<Json<ListVideosResponse>> {
    let page = state.videos.list(query.limit, query.bookmark).await?;
    Ok(Json(ListVideosResponse {
        count: page.videos.len(),
        videos: page.videos,
        bookmark: page.bookmark,
    }))
}

/// Fetch one video.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    _user: AuthUser,
) -> ApiResult<Json<VideoRecord>> {
    let video_id = VideoId::from_string(video_id);
    let record = state
        .videos
        .get(&video_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Video not found: {}", video_id)))?;
    Ok(Json(record))
}

// ============================================================================
// Update Video
// ============================================================================

/// Update video request.
///
/// Absent fields are left untouched; an empty description clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateVideoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Update a video's title and/or description.
pub async fn update_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
    Json(request): Json<UpdateVideoRequest>,
) -> ApiResult<Json<VideoRecord>> {
    let video_id = VideoId::from_string(video_id);

    // Validate title
    let title = match request.title.as_deref().map(str::trim) {
        Some("") => return Err(ApiError::bad_request("Title cannot be empty")),
        Some(t) if t.len() > 500 => {
            return Err(ApiError::bad_request("Title too long (max 500 characters)"))
        }
        other => other.map(str::to_string),
    };
    let description = request.description.map(|d| d.trim().to_string());

    if title.is_none() && description.is_none() {
        return Err(ApiError::bad_request("Nothing to update"));
    }

    if state.videos.get(&video_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Video not found: {}", video_id)));
    }

    let updated = state
        .videos
        .update(&video_id, |mut video| {
            if let Some(title) = &title {
                video.title = title.clone();
            }
            match description.as_deref() {
                Some("") => video.description = None,
                Some(d) => video.description = Some(d.to_string()),
                None => {}
            }
            video.updated_at = chrono::Utc::now();
            video
        })
        .await?;

    info!(user_id = %user.uid, video_id = %video_id, "Video metadata updated");

    Ok(Json(updated))
}

// ============================================================================
// Delete Video
// ============================================================================

/// Delete video response.
#[derive(Serialize)]
pub struct DeleteVideoResponse {
    pub success: bool,
    pub video_id: String,
    pub frames_deleted: u32,
    pub media_objects_deleted: u32,
}

/// Delete a video, its frame records, and all stored media.
pub async fn delete_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<DeleteVideoResponse>> {
    let video_id = VideoId::from_string(video_id);
    let deletion = state.library.delete_video(&video_id).await?;

    info!(user_id = %user.uid, video_id = %video_id, "Video deleted");

    Ok(Json(DeleteVideoResponse {
        success: true,
        video_id: video_id.to_string(),
        frames_deleted: deletion.frames_deleted,
        media_objects_deleted: deletion.media_objects_deleted,
    }))
}

// ============================================================================
// Video Media
// ============================================================================

/// Presigned URL lifetime for media redirects.
const PRESIGN_TTL: Duration = Duration::from_secs(900);

/// Query options for media requests.
#[derive(Debug, Deserialize)]
pub struct VideoMediaQuery {
    /// Redirect to a short-lived presigned URL instead of streaming.
    #[serde(default)]
    pub presign: Option<bool>,
}

/// Stream a video's source media with range request support.
///
/// Public by unguessable id, like the frame media route; `<video>` tags
/// cannot attach Authorization headers.
pub async fn video_media(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<VideoMediaQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let video_id = VideoId::from_string(video_id);

    let record = state
        .videos
        .get(&video_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Video not found: {}", video_id)))?;

    if query.presign.unwrap_or(false) {
        let url = state
            .store
            .presign_video_source(&video_id, PRESIGN_TTL)
            .await?;
        return Ok(Redirect::temporary(&url).into_response());
    }

    // Handle range requests
    let range_header = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let (bytes, content_length, _) = state
        .store
        .video_media(&video_id, range_header.as_deref())
        .await?;

    // Build response
    let mut response_builder = Response::builder()
        .header(header::CONTENT_TYPE, record.content_type.as_str())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .header("Cross-Origin-Resource-Policy", "cross-origin");

    if range_header.is_some() {
        response_builder = response_builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_LENGTH, bytes.len());
    } else {
        response_builder = response_builder
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, content_length);
    }

    response_builder
        .body(Body::from(bytes))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
}

// ============================================================================
// Frame Analysis (per-video)
// ============================================================================

/// Analysis part of a frame ingest.
#[derive(Debug, Deserialize)]
pub struct FrameAnalysisRequest {
    /// Caller-supplied frame id; generated when absent.
    #[serde(default)]
    pub frame_id: Option<String>,
    /// Position within the video, in seconds.
    pub timecode: f64,
    #[serde(default)]
    pub faces: Vec<FaceDetection>,
    #[serde(default)]
    pub keywords: Vec<KeywordDetection>,
}

/// Frame listing response.
#[derive(Serialize)]
pub struct ListFramesResponse {
    pub video_id: String,
    pub count: usize,
    pub frames: Vec<FrameRecord>,
}

/// List a video's frame analysis records in timecode order.
pub async fn list_frames(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    _user: AuthUser,
) -> ApiResult<Json<ListFramesResponse>> {
    let video_id = VideoId::from_string(video_id);

    if state.videos.get(&video_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Video not found: {}", video_id)));
    }

    let frames = state.frames.list_for_video(&video_id).await?;
    Ok(Json(ListFramesResponse {
        video_id: video_id.to_string(),
        count: frames.len(),
        frames,
    }))
}

/// Ingest one analyzed frame for a video.
///
/// Multipart form: an `analysis` JSON part plus the frame image in `file`.
/// This is the write path of the analysis pipeline.
pub async fn ingest_frame(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<FrameRecord>)> {
    let video_id = VideoId::from_string(video_id);

    let mut analysis: Option<FrameAnalysisRequest> = None;
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

    let analysis =
        analysis.ok_or_else(|| ApiError::bad_request("Missing required 'analysis' field"))?;
    let (content_type, data) =
        file.ok_or_else(|| ApiError::bad_request("Missing required 'file' field"))?;

    if !analysis.timecode.is_finite() || analysis.timecode < 0.0 {
        return Err(ApiError::bad_request("Timecode must be a non-negative number"));
    }
    if data.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let frame_id = match analysis.frame_id.as_deref().map(str::trim) {
        Some("") => return Err(ApiError::bad_request("Frame id cannot be empty")),
        Some(id) => FrameId::from_string(id),
        None => FrameId::new(),
    };
    let content_type = content_type.unwrap_or_else(|| "image/jpeg".to_string());

    let mut record =
        FrameRecord::new(frame_id, content_type).with_video(video_id.clone(), analysis.timecode);
    for face in analysis.faces {
        record.add_face(face);
    }
    for keyword in analysis.keywords {
        record.add_keyword(keyword);
    }

    let record = state.library.ingest_frame(record, data).await?;

    info!(
        user_id = %user.uid,
        video_id = %video_id,
        frame_id = %record.frame_id,
        faces = record.faces.len(),
        keywords = record.keywords.len(),
        "Frame ingested"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// Purge frames response.
#[derive(Serialize)]
pub struct PurgeFramesResponse {
    pub success: bool,
    pub video_id: String,
    pub frames_deleted: u32,
}

/// Drop a video's analysis results so the pipeline can run again (admin).
pub async fn purge_frames(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<PurgeFramesResponse>> {
    user.require_admin()?;

    let video_id = VideoId::from_string(video_id);
    let frames_deleted = state.library.purge_analysis(&video_id).await?;

    info!(
        user_id = %user.uid,
        video_id = %video_id,
        frames_deleted,
        "Analysis purged"
    );

    Ok(Json(PurgeFramesResponse {
        success: true,
        video_id: video_id.to_string(),
        frames_deleted,
    }))
}
