//! CouchDB HTTP client.
//!
//! Production-grade client with:
//! - Basic auth against the CouchDB REST API
//! - HTTP client tuning (pooling, timeouts)
//! - Exponential backoff with jitter
//! - Observability (tracing spans, metrics)

use std::time::{Duration, Instant};

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::{DocStoreError, DocStoreResult};
use crate::metrics::record_request;
use crate::retry::RetryConfig;
use crate::types::{
    DatabaseInfo, FindRequest, FindResponse, IndexAck, IndexRequest, Stored, WriteAck,
};

// =============================================================================
// Configuration
// =============================================================================

/// Document store client configuration.
#[derive(Debug, Clone)]
pub struct DocStoreConfig {
    /// Server base URL, e.g. `http://localhost:5984`
    pub base_url: String,
    /// Database name
    pub database: String,
    /// Basic auth username
    pub username: String,
    /// Basic auth password
    pub password: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl DocStoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> DocStoreResult<Self> {
        let base_url = std::env::var("COUCHDB_URL")
            .map_err(|_| DocStoreError::config("COUCHDB_URL must be set to reach CouchDB"))?;

        if base_url.is_empty() {
            return Err(DocStoreError::config("COUCHDB_URL cannot be empty"));
        }

        let connect_timeout_secs: u64 = std::env::var("COUCHDB_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            base_url,
            database: std::env::var("COUCHDB_DATABASE").unwrap_or_else(|_| "vidsum".to_string()),
            username: std::env::var("COUCHDB_USER").unwrap_or_else(|_| "admin".to_string()),
            password: std::env::var("COUCHDB_PASSWORD").unwrap_or_default(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// CouchDB REST API client.
#[derive(Clone)]
pub struct DocStoreClient {
    http: Client,
    config: DocStoreConfig,
    base_url: String,
    db_url: String,
}

impl DocStoreClient {
    /// Create a new client.
    pub fn new(config: DocStoreConfig) -> DocStoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("vsum-docstore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DocStoreError::Network)?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let db_url = format!("{}/{}", base_url, urlencoding::encode(&config.database));

        Ok(Self {
            http,
            config,
            base_url,
            db_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> DocStoreResult<Self> {
        let config = DocStoreConfig::from_env()?;
        Self::new(config)
    }

    /// Access the client configuration.
    pub fn config(&self) -> &DocStoreConfig {
        &self.config
    }

    /// Build document URL, percent-encoding the id.
    fn document_url(&self, doc_id: &str) -> String {
        format!("{}/{}", self.db_url, urlencoding::encode(doc_id))
    }

    /// Build an authenticated request.
    fn authed(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.config.username, Some(&self.config.password))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Verify the server is up.
    pub async fn ping(&self) -> DocStoreResult<()> {
        let url = format!("{}/_up", self.base_url);

        self.execute_request("ping", None, async {
            let response = self.authed(Method::GET, &url).send().await?;
            let status = response.status();

            if status.is_success() {
                Ok(())
            } else {
                Err(Self::handle_error_response(status, &url, response).await)
            }
        })
        .await
    }

    /// Create the database if it does not exist yet.
    pub async fn ensure_database(&self) -> DocStoreResult<()> {
        let url = self.db_url.clone();

        self.execute_request("ensure_database", None, async {
            let response = self.authed(Method::PUT, &url).send().await?;
            let status = response.status();

            match status {
                StatusCode::CREATED | StatusCode::ACCEPTED => {
                    info!(database = %self.config.database, "Created database");
                    Ok(())
                }
                // 412 means the database already exists
                StatusCode::PRECONDITION_FAILED => Ok(()),
                _ => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Create the Mango indexes the repositories query against.
    pub async fn ensure_indexes(&self) -> DocStoreResult<()> {
        self.create_index(IndexRequest::json(
            "type-created-at",
            vec!["type".to_string(), "created_at".to_string()],
        ))
        .await?;

        self.create_index(IndexRequest::json(
            "type-video-id",
            vec!["type".to_string(), "video_id".to_string()],
        ))
        .await?;

        Ok(())
    }

    async fn create_index(&self, index: IndexRequest) -> DocStoreResult<()> {
        let url = format!("{}/_index", self.db_url);

        self.execute_request("create_index", None, async {
            let response = self.authed(Method::POST, &url).json(&index).send().await?;
            let status = response.status();

            if status == StatusCode::OK {
                let ack: IndexAck = response.json().await?;
                debug!(index = %index.name, result = %ack.result, "Ensured index");
                Ok(())
            } else {
                Err(Self::handle_error_response(status, &url, response).await)
            }
        })
        .await
    }

    /// Fetch database info (document counts, name).
    pub async fn database_info(&self) -> DocStoreResult<DatabaseInfo> {
        let url = self.db_url.clone();

        self.execute_request("database_info", None, async {
            let response = self.authed(Method::GET, &url).send().await?;
            let status = response.status();

            if status == StatusCode::OK {
                let info: DatabaseInfo = response.json().await?;
                Ok(info)
            } else {
                Err(Self::handle_error_response(status, &url, response).await)
            }
        })
        .await
    }

    // =========================================================================
    // CRUD Operations
    // =========================================================================

    /// Get a document. Returns `None` when it does not exist.
    pub async fn get_document<T: DeserializeOwned>(
        &self,
        doc_id: &str,
    ) -> DocStoreResult<Option<Stored<T>>> {
        let url = self.document_url(doc_id);

        self.execute_request("get_document", Some(doc_id), async {
            let response = self.authed(Method::GET, &url).send().await?;
            let status = response.status();

            match status {
                StatusCode::OK => {
                    let doc: Stored<T> = response.json().await?;
                    Ok(Some(doc))
                }
                StatusCode::NOT_FOUND => Ok(None),
                _ => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Write a document. Creates when `_rev` is absent, updates when present.
    ///
    /// A stale or missing revision on an existing document yields
    /// [`DocStoreError::Conflict`].
    pub async fn put_document<T: Serialize>(&self, doc: &Stored<T>) -> DocStoreResult<WriteAck> {
        let url = self.document_url(&doc.id);

        self.execute_request("put_document", Some(&doc.id), async {
            let response = self.authed(Method::PUT, &url).json(doc).send().await?;
            let status = response.status();

            match status {
                StatusCode::CREATED | StatusCode::ACCEPTED => {
                    let ack: WriteAck = response.json().await?;
                    Ok(ack)
                }
                _ => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Delete a document at a known revision. Deleting a document that is
    /// already gone succeeds.
    pub async fn delete_document(&self, doc_id: &str, rev: &str) -> DocStoreResult<()> {
        let url = format!(
            "{}?rev={}",
            self.document_url(doc_id),
            urlencoding::encode(rev)
        );

        self.execute_request("delete_document", Some(doc_id), async {
            let response = self.authed(Method::DELETE, &url).send().await?;
            let status = response.status();

            match status {
                StatusCode::OK | StatusCode::ACCEPTED => Ok(()),
                StatusCode::NOT_FOUND => {
                    debug!(doc_id = %doc_id, "Delete of missing document ignored");
                    Ok(())
                }
                _ => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Run a Mango `_find` query and return one page of results.
    pub async fn find<T: DeserializeOwned>(
        &self,
        request: &FindRequest,
    ) -> DocStoreResult<FindResponse<T>> {
        let url = format!("{}/_find", self.db_url);

        self.execute_request("find", None, async {
            let response = self.authed(Method::POST, &url).json(request).send().await?;
            let status = response.status();

            if status == StatusCode::OK {
                let page: FindResponse<T> = response.json().await?;
                if let Some(warning) = &page.warning {
                    warn!(%warning, "Mango query warning");
                }
                Ok(page)
            } else {
                Err(Self::handle_error_response(status, &url, response).await)
            }
        })
        .await
    }

    /// Execute an operation with the configured retry policy.
    pub async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> DocStoreResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = DocStoreResult<T>>,
    {
        crate::retry::with_retry(&self.config.retry, operation, op).await
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(
        &self,
        operation: &str,
        doc_id: Option<&str>,
        fut: F,
    ) -> DocStoreResult<T>
    where
        F: std::future::Future<Output = DocStoreResult<T>>,
    {
        let span = if let Some(id) = doc_id {
            info_span!("docstore_request", operation = %operation, doc_id = %id)
        } else {
            info_span!("docstore_request", operation = %operation)
        };

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(
        status: StatusCode,
        url: &str,
        response: reqwest::Response,
    ) -> DocStoreError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000))
                .unwrap_or(1000);
            return DocStoreError::RateLimited(retry_after_ms);
        }

        let body = response.text().await.unwrap_or_default();
        DocStoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn test_config() -> DocStoreConfig {
        DocStoreConfig {
            base_url: "http://localhost:5984".to_string(),
            database: "vidsum".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_requires_url() {
        std::env::remove_var("COUCHDB_URL");
        let result = DocStoreConfig::from_env();
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_config_default_values() {
        std::env::set_var("COUCHDB_URL", "http://localhost:5984");
        std::env::remove_var("COUCHDB_DATABASE");
        std::env::remove_var("COUCHDB_USER");
        std::env::remove_var("COUCHDB_CONNECT_TIMEOUT_SECS");

        let config = DocStoreConfig::from_env().unwrap();
        assert_eq!(config.database, "vidsum");
        assert_eq!(config.username, "admin");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));

        std::env::remove_var("COUCHDB_URL");
    }

    #[test]
    fn test_document_url_encodes_id() {
        let client = DocStoreClient::new(test_config()).unwrap();
        let url = client.document_url("video:abc-123");
        assert_eq!(url, "http://localhost:5984/vidsum/video%3Aabc-123");
    }

    #[test]
    fn test_trailing_slash_trimmed_from_base_url() {
        let mut config = test_config();
        config.base_url = "http://localhost:5984/".to_string();
        let client = DocStoreClient::new(config).unwrap();
        let url = client.document_url("frame:1");
        assert_eq!(url, "http://localhost:5984/vidsum/frame%3A1");
    }
}
