//! Health check handlers.

use std::future::Future;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub storage: CheckStatus,
    pub metadata: CheckStatus,
    pub processor: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(backend: &'static str, latency_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            backend,
            error: None,
            latency_ms: Some(latency_ms),
        }
    }

    fn error(backend: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            backend,
            error: Some(msg.into()),
            latency_ms: None,
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

async fn timed_check<F, E>(backend: &'static str, check: F) -> CheckStatus
where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let start = Instant::now();
    match check.await {
        Ok(()) => CheckStatus::ok(backend, start.elapsed().as_millis() as u64),
        Err(e) => CheckStatus::error(backend, e.to_string()),
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks the object store, metadata store, and processor.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let (storage, metadata, processor) = tokio::join!(
        timed_check(state.storage.backend_name(), state.storage.check_connectivity()),
        timed_check(state.metadata.backend_name(), state.metadata.check_connectivity()),
        timed_check(state.processor.backend_name(), state.processor.check_health()),
    );

    let all_ok = storage.is_ok() && metadata.is_ok() && processor.is_ok();

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks {
            storage,
            metadata,
            processor,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
