//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::handlers::admin::admin_stats;
use crate::handlers::images::{delete_image, get_image, image_media, list_images, upload_image};
use crate::handlers::summary::video_summary;
use crate::handlers::videos::{
    delete_video, get_video, ingest_frame, list_frames, list_videos, purge_frames, update_video,
    upload_video, video_media,
};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let video_routes = Router::new()
        // Upload and listing
        .route("/videos", post(upload_video))
        .route("/videos", get(list_videos))
        // Single video operations
        .route("/videos/:video_id", get(get_video))
        .route("/videos/:video_id", patch(update_video))
        .route("/videos/:video_id", delete(delete_video))
        // Source media (public by unguessable id)
        .route("/videos/:video_id/media", get(video_media))
        // Frame analysis records
        .route("/videos/:video_id/frames", get(list_frames))
        .route("/videos/:video_id/frames", post(ingest_frame))
        .route("/videos/:video_id/frames", delete(purge_frames))
        // Summary
        .route("/videos/:video_id/summary", get(video_summary));

    let image_routes = Router::new()
        .route("/images", post(upload_image))
        .route("/images", get(list_images))
        .route("/images/:frame_id", get(get_image))
        .route("/images/:frame_id", delete(delete_image))
        // Image media (public; the provenance URL target)
        .route("/images/:frame_id/media", get(image_media));

    let admin_routes = Router::new().route("/admin/stats", get(admin_stats));

    // Create rate limiter for API routes
    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(
        state.config.rate_limit_rps,
        state.config.rate_limit_burst,
    ));

    let api_routes = Router::new()
        .merge(video_routes)
        .merge(image_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Request body size limits; uploads carry whole media files
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout,
        ))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
