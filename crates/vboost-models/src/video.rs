//! Uploaded video models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an uploaded video.
///
/// The same value names the row in the metadata store and the stem of the
/// processed artifact's object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Row inserted into the `videos` table after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NewVideoRecord {
    pub id: VideoId,
    /// Uploading principal, `None` for anonymous uploads
    pub user_id: Option<String>,
    /// Client-supplied file name
    pub original_name: String,
    /// Object-store path of the processed artifact
    pub processed_url: String,
}

impl NewVideoRecord {
    pub fn new(
        id: VideoId,
        user_id: Option<String>,
        original_name: impl Into<String>,
        processed_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            user_id,
            original_name: original_name.into(),
            processed_url: processed_url.into(),
        }
    }
}

/// Row of the `videos` table as read back from the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    pub id: VideoId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub processed_url: Option<String>,
}

impl VideoRecord {
    /// Materialize an inserted row, stamping the creation time.
    pub fn from_new(new: NewVideoRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new.id,
            created_at: Some(created_at),
            user_id: new.user_id,
            original_name: Some(new.original_name),
            processed_url: Some(new.processed_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_video_id_generation() {
        let id1 = VideoId::new();
        let id2 = VideoId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_video_ids_unique_over_many_generations() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(VideoId::new()));
        }
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn test_new_record_serializes_null_user() {
        let record = NewVideoRecord::new(VideoId::from("abc"), None, "clip.mp4", "abc.mp4");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], "abc");
        assert!(json["user_id"].is_null());
        assert_eq!(json["original_name"], "clip.mp4");
        assert_eq!(json["processed_url"], "abc.mp4");
    }

    #[test]
    fn test_video_record_tolerates_missing_columns() {
        let record: VideoRecord = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(record.id.as_str(), "abc");
        assert!(record.processed_url.is_none());
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_video_record_parses_postgres_timestamp() {
        let record: VideoRecord = serde_json::from_str(
            r#"{"id":"abc","created_at":"2024-03-01T10:15:30.123456+00:00","user_id":null}"#,
        )
        .unwrap();
        assert!(record.created_at.is_some());
        assert!(record.user_id.is_none());
    }
}
