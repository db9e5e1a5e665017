//! Axum HTTP API server.
//!
//! This crate provides:
//! - REST surface over the media library (videos, frames, images)
//! - The per-video summary endpoint driving the aggregation engine
//! - Bearer token auth, rate limiting, and security headers
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod provenance;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{MediaLibrary, StoreSummarySource};
pub use state::AppState;
