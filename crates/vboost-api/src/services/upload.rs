//! Upload orchestration.
//!
//! Order: resolve principal, process, write object, insert metadata. Any
//! failure short-circuits; an object written before a failed insert is left
//! in place and reported as an orphan.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span, warn, Instrument};

use vboost_metadata::{MetadataStore, PrincipalResolver};
use vboost_models::{NewVideoRecord, ProcessResponse, VideoId};
use vboost_processor::{ProcessRequest, VideoProcessor};
use vboost_storage::{processed_video_key, ObjectStore, VIDEO_CONTENT_TYPE};

use crate::auth::resolve_principal;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// A validated upload.
#[derive(Debug, Clone)]
pub struct UploadInput {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    /// Normalized B-roll style; blank values already dropped
    pub broll: Option<String>,
}

/// Runs the upload pipeline against the injected clients.
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataStore>,
    processor: Arc<dyn VideoProcessor>,
    principals: Arc<dyn PrincipalResolver>,
}

impl UploadService {
    pub fn new(state: &AppState) -> Self {
        Self {
            storage: Arc::clone(&state.storage),
            metadata: Arc::clone(&state.metadata),
            processor: Arc::clone(&state.processor),
            principals: Arc::clone(&state.principals),
        }
    }

    pub async fn process_upload(
        &self,
        input: UploadInput,
        bearer: Option<&str>,
    ) -> ApiResult<ProcessResponse> {
        let span = info_span!("upload", file_name = %input.file_name, bytes = input.bytes.len());
        let result = self.run(input, bearer).instrument(span).await;

        metrics::record_upload(match &result {
            Ok(_) => "success",
            Err(ApiError::ProcessingFailed { .. }) => "processing_failed",
            Err(ApiError::StorageWriteFailed(_)) => "storage_failed",
            Err(ApiError::MetadataWriteFailed(_)) => "metadata_failed",
            Err(_) => "error",
        });

        result
    }

    async fn run(&self, input: UploadInput, bearer: Option<&str>) -> ApiResult<ProcessResponse> {
        let principal = resolve_principal(self.principals.as_ref(), bearer).await;
        let user_id = principal.map(|p| p.user_id);

        metrics::record_upload_bytes(input.bytes.len());
        let original_name = input.file_name.clone();

        // Process
        let start = Instant::now();
        let processed = self
            .processor
            .process(ProcessRequest {
                file_name: input.file_name,
                content_type: input.content_type,
                bytes: input.bytes,
                broll: input.broll,
            })
            .await;
        metrics::record_processor_duration(
            self.processor.backend_name(),
            processed.is_ok(),
            start.elapsed().as_secs_f64(),
        );

        let processed = processed.map_err(|e| ApiError::ProcessingFailed {
            message: e.to_string(),
            details: e.details(),
        })?;

        // Store
        let video_id = VideoId::new();
        let key = processed_video_key(&video_id);
        let processed_bytes = processed.bytes.len();

        let start = Instant::now();
        self.storage
            .put_object(&key, processed.bytes, VIDEO_CONTENT_TYPE)
            .await
            .map_err(ApiError::StorageWriteFailed)?;
        metrics::record_object_write_duration(
            self.storage.backend_name(),
            start.elapsed().as_secs_f64(),
        );

        let video_url = self.storage.public_url(&key).map_err(|e| {
            warn!(key = %key, "Stored object has no public URL; object is orphaned");
            ApiError::internal(format!("Failed to resolve public URL for {}: {}", key, e))
        })?;

        // Record
        let record = NewVideoRecord::new(video_id.clone(), user_id.clone(), original_name, key.clone());
        if let Err(e) = self.metadata.insert_video(record).await {
            warn!(
                video_id = %video_id,
                key = %key,
                "Metadata insert failed; stored object is orphaned"
            );
            return Err(ApiError::MetadataWriteFailed(e));
        }

        info!(
            video_id = %video_id,
            user_id = ?user_id,
            key = %key,
            bytes = processed_bytes,
            "Video processed and stored"
        );

        Ok(ProcessResponse::new(video_id, video_url, processed.captions))
    }
}
