//! Processed video models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::video::VideoId;

/// Processing status as stored in `processed_videos.status`.
///
/// Statuses written by other producers are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProcessingStatus {
    Processing,
    Completed,
    Failed,
    Other(String),
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
            ProcessingStatus::Other(s) => s,
        }
    }
}

impl From<String> for ProcessingStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "processing" => ProcessingStatus::Processing,
            "completed" => ProcessingStatus::Completed,
            "failed" => ProcessingStatus::Failed,
            _ => ProcessingStatus::Other(s),
        }
    }
}

impl From<ProcessingStatus> for String {
    fn from(status: ProcessingStatus) -> Self {
        match status {
            ProcessingStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Row of the `processed_videos` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessedVideoRecord {
    pub id: VideoId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Public URL of the processed artifact
    #[serde(default)]
    pub url: Option<String>,
    /// Generated caption text
    #[serde(default)]
    pub captions: Option<String>,
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub status: Option<ProcessingStatus>,
    /// B-roll category requested for this video
    #[serde(default)]
    pub broll_type: Option<String>,
}

impl ProcessedVideoRecord {
    /// Minimal record with only an id, used by tests and seeding.
    pub fn new(id: VideoId) -> Self {
        Self {
            id,
            created_at: None,
            user_id: None,
            url: None,
            captions: None,
            status: None,
            broll_type: None,
        }
    }
}
