//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vsum_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vsum_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vsum_http_requests_in_flight";

    // Summary engine metrics
    pub const SUMMARY_BUILDS_TOTAL: &str = "vsum_summary_builds_total";
    pub const SUMMARY_BUILD_DURATION_SECONDS: &str = "vsum_summary_build_duration_seconds";

    // Upload metrics
    pub const MEDIA_UPLOADS_TOTAL: &str = "vsum_media_uploads_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "vsum_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a summary build attempt and its duration.
pub fn record_summary_build(outcome: &str, duration_secs: f64) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::SUMMARY_BUILDS_TOTAL, &labels).increment(1);
    histogram!(names::SUMMARY_BUILD_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a stored media object (video source, video frame, or image).
pub fn record_media_upload(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::MEDIA_UPLOADS_TOTAL, &labels).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("valid regex")
});
static NUMERIC_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[0-9]+(/|$)").expect("valid regex"));
static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/videos/[a-zA-Z0-9_.-]+").expect("valid regex"));
static IMAGE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/images/[a-zA-Z0-9_.-]+").expect("valid regex"));

/// Sanitize path for metrics labels (replace ids with placeholders so label
/// cardinality stays bounded).
fn sanitize_path(path: &str) -> String {
    let path = UUID_RE.replace_all(path, ":id");
    let path = NUMERIC_ID_RE.replace_all(&path, "/:id$1");
    let path = VIDEO_ID_RE.replace_all(&path, "/videos/:video_id");
    let path = IMAGE_ID_RE.replace_all(&path, "/images/:frame_id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_replaces_resource_ids() {
        // UUID ids collapse before the route-shaped patterns get a look
        assert_eq!(
            sanitize_path("/api/videos/b1e92c3a-1111-4222-8333-444455556666/summary"),
            "/api/videos/:id/summary"
        );
        assert_eq!(
            sanitize_path("/api/images/f-20260110-0042/media"),
            "/api/images/:frame_id/media"
        );
        assert_eq!(sanitize_path("/api/videos/clip42"), "/api/videos/:video_id");
        assert_eq!(
            sanitize_path("/api/videos/clip42/frames"),
            "/api/videos/:video_id/frames"
        );
    }

    #[test]
    fn test_sanitize_path_leaves_static_routes_alone() {
        assert_eq!(sanitize_path("/health"), "/health");
        assert_eq!(sanitize_path("/api/videos"), "/api/videos");
        assert_eq!(sanitize_path("/api/admin/stats"), "/api/admin/stats");
    }
}
