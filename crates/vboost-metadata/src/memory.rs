//! In-memory metadata store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use vboost_models::{NewVideoRecord, ProcessedVideoRecord, VideoId, VideoRecord};

use crate::error::{MetadataError, MetadataResult};
use crate::store::MetadataStore;

/// Metadata store kept in process memory. Rows are never updated or removed.
#[derive(Default)]
pub struct MemoryMetadataStore {
    videos: RwLock<HashMap<VideoId, VideoRecord>>,
    processed: RwLock<HashMap<VideoId, ProcessedVideoRecord>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a `processed_videos` row, as the processing side would.
    pub async fn insert_processed_video(&self, record: ProcessedVideoRecord) {
        self.processed.write().await.insert(record.id.clone(), record);
    }

    pub async fn video_count(&self) -> usize {
        self.videos.read().await.len()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn insert_video(&self, record: NewVideoRecord) -> MetadataResult<VideoRecord> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&record.id) {
            return Err(MetadataError::Conflict(format!("videos/{}", record.id)));
        }

        let stored = VideoRecord::from_new(record, Utc::now());
        videos.insert(stored.id.clone(), stored.clone());

        info!(video_id = %stored.id, "Inserted video record (memory)");
        Ok(stored)
    }

    async fn find_video(&self, id: &VideoId) -> MetadataResult<Option<VideoRecord>> {
        Ok(self.videos.read().await.get(id).cloned())
    }

    async fn find_processed_video(
        &self,
        id: &VideoId,
    ) -> MetadataResult<Option<ProcessedVideoRecord>> {
        Ok(self.processed.read().await.get(id).cloned())
    }

    async fn check_connectivity(&self) -> MetadataResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
