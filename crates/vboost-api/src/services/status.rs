//! Video status lookup.

use std::sync::Arc;

use tracing::debug;

use vboost_metadata::MetadataStore;
use vboost_models::{VideoId, VideoStatusResponse};
use vboost_storage::ObjectStore;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Reads status from `processed_videos`, falling back to the upload row.
#[derive(Clone)]
pub struct StatusService {
    storage: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataStore>,
}

impl StatusService {
    pub fn new(state: &AppState) -> Self {
        Self {
            storage: Arc::clone(&state.storage),
            metadata: Arc::clone(&state.metadata),
        }
    }

    pub async fn lookup(&self, id: Option<&str>) -> ApiResult<VideoStatusResponse> {
        let id = id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::missing_input("Video ID is required"))?;
        let video_id = VideoId::from(id);

        let result = self.find(&video_id).await;
        metrics::record_status_lookup(match &result {
            Ok((_, source)) => *source,
            Err(ApiError::NotFound) => "not_found",
            Err(_) => "error",
        });

        result.map(|(response, _)| response)
    }

    async fn find(&self, id: &VideoId) -> ApiResult<(VideoStatusResponse, &'static str)> {
        if let Some(record) = self
            .metadata
            .find_processed_video(id)
            .await
            .map_err(ApiError::MetadataReadFailed)?
        {
            return Ok((record.into(), "processed"));
        }

        let record = self
            .metadata
            .find_video(id)
            .await
            .map_err(ApiError::MetadataReadFailed)?
            .ok_or(ApiError::NotFound)?;

        debug!(video_id = %id, "No processed_videos row, reporting upload record");

        let url = record
            .processed_url
            .as_deref()
            .map(|key| self.storage.public_url(key))
            .transpose()
            .map_err(|e| ApiError::internal(format!("Failed to resolve public URL: {}", e)))?;

        Ok((VideoStatusResponse::untracked(url), "uploaded"))
    }
}
