//! Media link building for summary occurrences.
//!
//! Every occurrence in a summary carries a URL that serves the frame image
//! it was detected in. Links are absolute so they survive being copied out
//! of the API response; the base comes from `PUBLIC_BASE_URL` when
//! configured, otherwise from the request's own scheme and host.

use axum::http::{header, HeaderMap};

use vsum_models::FrameId;

use crate::config::ApiConfig;

/// Resolve the base URL for generated links.
///
/// Behind a TLS-terminating proxy the request itself arrives over plain
/// HTTP, so the original scheme is taken from `X-Forwarded-Proto`.
pub fn public_base_url(config: &ApiConfig, headers: &HeaderMap) -> String {
    if let Some(base) = &config.public_base_url {
        return base.clone();
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("http");

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{}://{}", scheme, host)
}

/// URL of the media route serving a frame image.
pub fn frame_media_url(base: &str, frame_id: &FrameId) -> String {
    format!("{}/api/images/{}/media", base, frame_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).expect("header name"),
                HeaderValue::from_str(value).expect("header value"),
            );
        }
        map
    }

    #[test]
    fn test_configured_base_wins() {
        let config = ApiConfig {
            public_base_url: Some("https://media.example.com".to_string()),
            ..ApiConfig::default()
        };
        let headers = headers(&[("host", "internal:8000"), ("x-forwarded-proto", "http")]);

        assert_eq!(public_base_url(&config, &headers), "https://media.example.com");
    }

    #[test]
    fn test_forwarded_proto_overrides_scheme() {
        let config = ApiConfig::default();
        let headers = headers(&[("host", "api.example.com"), ("x-forwarded-proto", "https")]);

        assert_eq!(public_base_url(&config, &headers), "https://api.example.com");
    }

    #[test]
    fn test_forwarded_proto_uses_first_hop() {
        let config = ApiConfig::default();
        let headers = headers(&[("host", "api.example.com"), ("x-forwarded-proto", "https, http")]);

        assert_eq!(public_base_url(&config, &headers), "https://api.example.com");
    }

    #[test]
    fn test_plain_request_defaults_to_http() {
        let config = ApiConfig::default();
        let headers = headers(&[("host", "localhost:8000")]);

        assert_eq!(public_base_url(&config, &headers), "http://localhost:8000");
    }

    #[test]
    fn test_frame_media_url_shape() {
        let url = frame_media_url("https://media.example.com", &FrameId::from_string("f-42"));
        assert_eq!(url, "https://media.example.com/api/images/f-42/media");
    }
}
