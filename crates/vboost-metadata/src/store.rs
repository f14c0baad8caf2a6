//! Metadata store abstraction and its PostgREST implementation.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use vboost_models::{NewVideoRecord, ProcessedVideoRecord, VideoId, VideoRecord};

use crate::client::PostgrestClient;
use crate::error::MetadataResult;

/// Table written by the upload flow.
pub const VIDEOS_TABLE: &str = "videos";

/// Table written by the processing side and read by status lookup.
pub const PROCESSED_VIDEOS_TABLE: &str = "processed_videos";

/// Create-once, read-many store for video records.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a `videos` row and return it as stored.
    async fn insert_video(&self, record: NewVideoRecord) -> MetadataResult<VideoRecord>;

    /// Look up a `videos` row. Absence is `Ok(None)`.
    async fn find_video(&self, id: &VideoId) -> MetadataResult<Option<VideoRecord>>;

    /// Look up a `processed_videos` row. Absence is `Ok(None)`.
    async fn find_processed_video(
        &self,
        id: &VideoId,
    ) -> MetadataResult<Option<ProcessedVideoRecord>>;

    async fn check_connectivity(&self) -> MetadataResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// Metadata store backed by Supabase's PostgREST API.
#[derive(Clone)]
pub struct PostgrestMetadataStore {
    client: PostgrestClient,
}

impl PostgrestMetadataStore {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataStore for PostgrestMetadataStore {
    async fn insert_video(&self, record: NewVideoRecord) -> MetadataResult<VideoRecord> {
        let stored: VideoRecord = self.client.insert_row(VIDEOS_TABLE, &record).await?;

        info!(
            video_id = %stored.id,
            user_id = ?stored.user_id,
            "Inserted video record"
        );

        // Older schemas return the row without created_at
        Ok(VideoRecord {
            created_at: stored.created_at.or_else(|| Some(Utc::now())),
            ..stored
        })
    }

    async fn find_video(&self, id: &VideoId) -> MetadataResult<Option<VideoRecord>> {
        self.client.select_by_id(VIDEOS_TABLE, id.as_str()).await
    }

    async fn find_processed_video(
        &self,
        id: &VideoId,
    ) -> MetadataResult<Option<ProcessedVideoRecord>> {
        self.client
            .select_by_id(PROCESSED_VIDEOS_TABLE, id.as_str())
            .await
    }

    async fn check_connectivity(&self) -> MetadataResult<()> {
        self.client.ping(VIDEOS_TABLE).await
    }

    fn backend_name(&self) -> &'static str {
        "postgrest"
    }
}
