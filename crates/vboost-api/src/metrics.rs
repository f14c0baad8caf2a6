//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vboost_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vboost_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vboost_http_requests_in_flight";

    // Upload pipeline
    pub const UPLOADS_TOTAL: &str = "vboost_uploads_total";
    pub const PROCESSOR_DURATION_SECONDS: &str = "vboost_processor_duration_seconds";
    pub const OBJECT_WRITE_DURATION_SECONDS: &str = "vboost_object_write_duration_seconds";
    pub const UPLOAD_BYTES: &str = "vboost_upload_bytes";

    // Status lookups
    pub const STATUS_LOOKUPS_TOTAL: &str = "vboost_status_lookups_total";
}

/// Routes reported by name; everything else is `other`.
const KNOWN_PATHS: &[&str] = &[
    "/api/process",
    "/api/videos",
    "/api/broll-styles",
    "/health",
    "/healthz",
    "/ready",
    "/metrics",
];

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

/// Record the final outcome of an upload.
pub fn record_upload(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::UPLOADS_TOTAL, &labels).increment(1);
}

/// Record processor duration.
pub fn record_processor_duration(backend: &str, success: bool, duration_secs: f64) {
    let labels = [
        ("backend", backend.to_string()),
        ("outcome", if success { "ok" } else { "error" }.to_string()),
    ];
    histogram!(names::PROCESSOR_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record object store write duration.
pub fn record_object_write_duration(backend: &str, duration_secs: f64) {
    let labels = [("backend", backend.to_string())];
    histogram!(names::OBJECT_WRITE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record size of an uploaded (pre-processing) file.
pub fn record_upload_bytes(bytes: usize) {
    histogram!(names::UPLOAD_BYTES).record(bytes as f64);
}

/// Record a status lookup by result (`processed`, `uploaded`, `not_found`, `error`).
pub fn record_status_lookup(result: &str) {
    let labels = [("result", result.to_string())];
    counter!(names::STATUS_LOOKUPS_TOTAL, &labels).increment(1);
}

/// Collapse unknown paths so probes of random URLs don't explode label cardinality.
fn sanitize_path(path: &str) -> String {
    let trimmed = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };

    if KNOWN_PATHS.contains(&trimmed) {
        trimmed.to_string()
    } else {
        "other".to_string()
    }
}

/// Holds one unit of the in-flight gauge until dropped, including on cancellation.
struct InFlightGuard;

impl InFlightGuard {
    fn enter() -> Self {
        gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
        Self
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let _in_flight = InFlightGuard::enter();
    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
