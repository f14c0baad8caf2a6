//! API integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use vboost_api::{create_router, ApiConfig, AppState};
use vboost_metadata::{
    AnonymousPrincipals, MemoryMetadataStore, MetadataError, MetadataResult, MetadataStore,
    Principal, PrincipalResolver,
};
use vboost_models::{
    NewVideoRecord, ProcessedVideoRecord, ProcessingStatus, VideoId, VideoRecord,
};
use vboost_processor::{
    PassthroughProcessor, ProcessRequest, ProcessedOutput, ProcessorError, ProcessorResult,
    VideoProcessor,
};
use vboost_storage::{
    MemoryObjectStore, ObjectStore, PublicUrlBuilder, StorageError, StorageResult,
    DEFAULT_BUCKET, LOCAL_PUBLIC_BASE_URL,
};

const BOUNDARY: &str = "vboost-test-boundary";

type CallLog = Arc<Mutex<Vec<String>>>;

fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn record(log: &CallLog, call: impl Into<String>) {
    log.lock().unwrap().push(call.into());
}

// Recording fakes

struct RecordingProcessor {
    log: CallLog,
    fail: bool,
}

#[async_trait]
impl VideoProcessor for RecordingProcessor {
    async fn process(&self, request: ProcessRequest) -> ProcessorResult<ProcessedOutput> {
        record(
            &self.log,
            format!("process:{}", request.broll.as_deref().unwrap_or("-")),
        );
        if self.fail {
            return Err(ProcessorError::rejected(500, r#"{"error":"bad codec"}"#.to_string()));
        }
        let mut bytes = b"processed:".to_vec();
        bytes.extend_from_slice(&request.bytes);
        Ok(ProcessedOutput::new(bytes))
    }

    async fn check_health(&self) -> ProcessorResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

struct RecordingStore {
    log: CallLog,
    fail: bool,
    inner: MemoryObjectStore,
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        record(&self.log, "put");
        if self.fail {
            return Err(StorageError::upload_failed("bucket unavailable"));
        }
        self.inner.put_object(key, data, content_type).await
    }

    fn public_url(&self, key: &str) -> StorageResult<String> {
        self.inner.public_url(key)
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        record(&self.log, "storage_ping");
        if self.fail {
            return Err(StorageError::upload_failed("bucket unavailable"));
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

struct RecordingMetadata {
    log: CallLog,
    fail_insert: bool,
    fail_read: bool,
    inner: MemoryMetadataStore,
}

#[async_trait]
impl MetadataStore for RecordingMetadata {
    async fn insert_video(&self, record_in: NewVideoRecord) -> MetadataResult<VideoRecord> {
        record(&self.log, "insert");
        if self.fail_insert {
            return Err(MetadataError::from_http_status(503, "database unavailable"));
        }
        self.inner.insert_video(record_in).await
    }

    async fn find_video(&self, id: &VideoId) -> MetadataResult<Option<VideoRecord>> {
        record(&self.log, "find_video");
        if self.fail_read {
            return Err(MetadataError::from_http_status(503, "database unavailable"));
        }
        self.inner.find_video(id).await
    }

    async fn find_processed_video(
        &self,
        id: &VideoId,
    ) -> MetadataResult<Option<ProcessedVideoRecord>> {
        record(&self.log, "find_processed_video");
        if self.fail_read {
            return Err(MetadataError::from_http_status(503, "database unavailable"));
        }
        self.inner.find_processed_video(id).await
    }

    async fn check_connectivity(&self) -> MetadataResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

struct FixedPrincipal;

#[async_trait]
impl PrincipalResolver for FixedPrincipal {
    async fn resolve(&self, token: &str) -> MetadataResult<Option<Principal>> {
        match token {
            "good-token" => Ok(Some(Principal {
                user_id: "user-1".to_string(),
                email: Some("user@example.com".to_string()),
            })),
            "broken-token" => Err(MetadataError::from_http_status(502, "auth down")),
            _ => Ok(None),
        }
    }

    fn backend_name(&self) -> &'static str {
        "fixed"
    }
}

// Fixtures

struct Harness {
    log: CallLog,
    metadata: Arc<RecordingMetadata>,
    storage: Arc<RecordingStore>,
    app: Router,
}

#[derive(Default)]
struct HarnessOptions {
    fail_processor: bool,
    fail_storage: bool,
    fail_insert: bool,
    fail_read: bool,
    max_body_size: Option<usize>,
    environment: Option<&'static str>,
}

fn url_builder() -> PublicUrlBuilder {
    PublicUrlBuilder::new(LOCAL_PUBLIC_BASE_URL, DEFAULT_BUCKET).unwrap()
}

fn harness(options: HarnessOptions) -> Harness {
    let log: CallLog = Arc::default();

    let storage = Arc::new(RecordingStore {
        log: Arc::clone(&log),
        fail: options.fail_storage,
        inner: MemoryObjectStore::new(url_builder()),
    });
    let metadata = Arc::new(RecordingMetadata {
        log: Arc::clone(&log),
        fail_insert: options.fail_insert,
        fail_read: options.fail_read,
        inner: MemoryMetadataStore::new(),
    });
    let processor = Arc::new(RecordingProcessor {
        log: Arc::clone(&log),
        fail: options.fail_processor,
    });

    let mut config = ApiConfig::default();
    if let Some(limit) = options.max_body_size {
        config.max_body_size = limit;
    }
    if let Some(environment) = options.environment {
        config.environment = environment.to_string();
    }

    let state = AppState::new(
        config,
        storage.clone(),
        metadata.clone(),
        processor,
        Arc::new(FixedPrincipal),
    );

    Harness {
        log,
        metadata,
        storage,
        app: create_router(state, None),
    }
}

/// App wired entirely to the in-process backends.
fn in_memory_app() -> (Router, Arc<MemoryMetadataStore>) {
    let metadata = Arc::new(MemoryMetadataStore::new());
    let state = AppState::new(
        ApiConfig::default(),
        Arc::new(MemoryObjectStore::new(url_builder())),
        metadata.clone(),
        Arc::new(PassthroughProcessor),
        Arc::new(AnonymousPrincipals),
    );
    (create_router(state, None), metadata)
}

enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a str,
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn multipart_body(parts: &[Part<'_>]) -> String {
    let mut body = String::new();
    for part in parts {
        body.push_str(&format!("--{}\r\n", BOUNDARY));
        match part {
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, file_name
                ));
                body.push_str(&format!("Content-Type: {}\r\n\r\n", content_type));
                body.push_str(data);
            }
            Part::Text { name, value } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                ));
                body.push_str(value);
            }
        }
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    body
}

fn video_part(data: &str) -> Part<'_> {
    Part::File {
        name: "file",
        file_name: "clip.mp4",
        content_type: "video/mp4",
        data,
    }
}

fn upload_request(parts: &[Part<'_>], bearer: Option<&str>) -> Request<Body> {
    let body = multipart_body(parts);
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/process")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header("content-length", body.len());
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// Upload

#[tokio::test]
async fn test_upload_runs_process_then_put_then_insert() {
    let h = harness(HarnessOptions::default());

    let (status, body) = send(
        &h.app,
        upload_request(
            &[video_part("raw-bytes"), Part::Text { name: "broll", value: "nature" }],
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(calls(&h.log), vec!["process:nature", "put", "insert"]);

    let video_id = body["videoId"].as_str().unwrap().to_string();
    let key = format!("{}.mp4", video_id);
    assert_eq!(
        body["videoUrl"],
        format!("{}/{}/{}", LOCAL_PUBLIC_BASE_URL, DEFAULT_BUCKET, key)
    );
    assert!(body.get("captions").is_none());

    let stored = h.storage.inner.get(&key).await.unwrap();
    assert_eq!(stored.data, b"processed:raw-bytes".to_vec());
    assert_eq!(stored.content_type, "video/mp4");

    let row = h
        .metadata
        .inner
        .find_video(&VideoId::from(video_id.as_str()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.processed_url.as_deref(), Some(key.as_str()));
    assert_eq!(row.original_name.as_deref(), Some("clip.mp4"));
    assert!(row.user_id.is_none());
}

#[tokio::test]
async fn test_upload_without_file_touches_nothing() {
    let h = harness(HarnessOptions::default());

    let (status, body) = send(
        &h.app,
        upload_request(&[Part::Text { name: "broll", value: "city" }], None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
    assert!(calls(&h.log).is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let h = harness(HarnessOptions::default());

    let request = Request::builder()
        .method("POST")
        .uri("/api/process")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid upload"));
    assert!(calls(&h.log).is_empty());
}

#[tokio::test]
async fn test_blank_broll_is_not_forwarded() {
    let h = harness(HarnessOptions::default());

    let (status, _) = send(
        &h.app,
        upload_request(
            &[video_part("x"), Part::Text { name: "broll", value: "  " }],
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(calls(&h.log)[0], "process:-");
}

#[tokio::test]
async fn test_authenticated_upload_records_user() {
    let h = harness(HarnessOptions::default());

    let (status, body) = send(&h.app, upload_request(&[video_part("x")], Some("good-token"))).await;
    assert_eq!(status, StatusCode::OK);

    let id = VideoId::from(body["videoId"].as_str().unwrap());
    let row = h.metadata.inner.find_video(&id).await.unwrap().unwrap();
    assert_eq!(row.user_id.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn test_auth_failure_falls_back_to_anonymous() {
    let h = harness(HarnessOptions::default());

    for token in ["broken-token", "expired-token"] {
        let (status, body) = send(&h.app, upload_request(&[video_part("x")], Some(token))).await;
        assert_eq!(status, StatusCode::OK);

        let id = VideoId::from(body["videoId"].as_str().unwrap());
        let row = h.metadata.inner.find_video(&id).await.unwrap().unwrap();
        assert!(row.user_id.is_none());
    }
}

#[tokio::test]
async fn test_processor_failure_surfaces_details() {
    let h = harness(HarnessOptions {
        fail_processor: true,
        ..Default::default()
    });

    let (status, body) = send(&h.app, upload_request(&[video_part("x")], None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Video processing failed");
    assert_eq!(body["details"], json!({"error": "bad codec"}));
    assert_eq!(calls(&h.log), vec!["process:-"]);
    assert_eq!(h.metadata.inner.video_count().await, 0);
}

#[tokio::test]
async fn test_storage_failure_skips_metadata_insert() {
    let h = harness(HarnessOptions {
        fail_storage: true,
        ..Default::default()
    });

    let (status, body) = send(&h.app, upload_request(&[video_part("x")], None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to store processed video");
    assert_eq!(calls(&h.log), vec!["process:-", "put"]);
    assert_eq!(h.metadata.inner.video_count().await, 0);
}

#[tokio::test]
async fn test_metadata_insert_failure_leaves_stored_object() {
    let h = harness(HarnessOptions {
        fail_insert: true,
        ..Default::default()
    });

    let (status, body) = send(&h.app, upload_request(&[video_part("x")], None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to save video metadata");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("database unavailable"));
    assert_eq!(calls(&h.log), vec!["process:-", "put", "insert"]);

    let keys = h.storage.inner.keys().await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].ends_with(".mp4"));
    assert_eq!(h.metadata.inner.video_count().await, 0);
}

#[tokio::test]
async fn test_production_hides_backend_details() {
    let h = harness(HarnessOptions {
        fail_storage: true,
        environment: Some("production"),
        ..Default::default()
    });

    let (status, body) = send(&h.app, upload_request(&[video_part("x")], None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to store processed video"}));
}

#[tokio::test]
async fn test_production_keeps_processor_details() {
    let h = harness(HarnessOptions {
        fail_processor: true,
        environment: Some("production"),
        ..Default::default()
    });

    let (status, body) = send(&h.app, upload_request(&[video_part("x")], None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"], json!({"error": "bad codec"}));
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let h = harness(HarnessOptions {
        max_body_size: Some(64),
        ..Default::default()
    });

    let data = "x".repeat(1024);
    let (status, body) = send(&h.app, upload_request(&[video_part(&data)], None)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Request body too large"));
    assert!(calls(&h.log).is_empty());
}

// Status

#[tokio::test]
async fn test_status_requires_id() {
    let h = harness(HarnessOptions::default());

    for uri in ["/api/videos", "/api/videos?id=", "/api/videos?id=%20"] {
        let (status, body) = send(&h.app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Video ID is required");
    }
    assert!(calls(&h.log).is_empty());
}

#[tokio::test]
async fn test_status_unknown_id_is_not_found() {
    let h = harness(HarnessOptions::default());

    let (status, body) = send(&h.app, get("/api/videos?id=does-not-exist")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Video not found");
    assert_eq!(calls(&h.log), vec!["find_processed_video", "find_video"]);
}

#[tokio::test]
async fn test_status_store_error_is_not_reported_as_missing() {
    let h = harness(HarnessOptions {
        fail_read: true,
        ..Default::default()
    });

    let (status, body) = send(&h.app, get("/api/videos?id=v1")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch video");
    assert_eq!(calls(&h.log), vec!["find_processed_video"]);
}

#[tokio::test]
async fn test_status_reads_processed_row() {
    let (app, metadata) = in_memory_app();

    let mut row = ProcessedVideoRecord::new(VideoId::from("v1"));
    row.url = Some("https://cdn.example.com/v1.mp4".to_string());
    row.captions = Some("hello world".to_string());
    row.status = Some(ProcessingStatus::Completed);
    metadata.insert_processed_video(row).await;

    let (status, body) = send(&app, get("/api/videos?id=v1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "url": "https://cdn.example.com/v1.mp4",
            "captions": "hello world",
            "status": "completed"
        })
    );
}

#[tokio::test]
async fn test_upload_then_status_round_trip() {
    let (app, _) = in_memory_app();

    let (status, upload) = send(
        &app,
        upload_request(
            &[video_part("raw"), Part::Text { name: "broll", value: "" }],
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let id = upload["videoId"].as_str().unwrap();
    let (status, body) = send(&app, get(&format!("/api/videos?id={}", id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], upload["videoUrl"]);
    assert!(body["captions"].is_null());
    assert!(body["status"].is_null());
}

// Catalogue and probes

#[tokio::test]
async fn test_broll_styles() {
    let (app, _) = in_memory_app();

    let (status, body) = send(&app, get("/api/broll-styles")).await;

    assert_eq!(status, StatusCode::OK);
    let options = body.as_array().unwrap();
    assert_eq!(options.len(), 8);
    assert_eq!(options[0], json!({"value": "", "label": "No B-roll"}));
    assert!(options.iter().any(|o| o["value"] == "nature"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = in_memory_app();

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = send(&app, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_ready_endpoint() {
    let (app, _) = in_memory_app();

    let (status, body) = send(&app, get("/ready")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["storage"]["backend"], "memory");
    assert_eq!(body["checks"]["processor"]["backend"], "passthrough");
}

#[tokio::test]
async fn test_ready_reports_degraded_backend() {
    let h = harness(HarnessOptions {
        fail_storage: true,
        ..Default::default()
    });

    let (status, body) = send(&h.app, get("/ready")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["storage"]["status"], "error");
    assert_eq!(body["checks"]["metadata"]["status"], "ok");
}

#[tokio::test]
async fn test_metrics_route_absent_without_handle() {
    let (app, _) = in_memory_app();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (app, _) = in_memory_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}
