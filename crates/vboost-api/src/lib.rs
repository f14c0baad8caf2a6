//! Axum HTTP API server.
//!
//! This crate provides:
//! - `POST /api/process`: upload, process, store, record
//! - `GET /api/videos?id=`: status lookup
//! - Health/readiness probes and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{ApiConfig, BackendSelection};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
