//! HTTP wire types shared by the API and its clients.
//!
//! Field names follow the existing web client (`videoUrl`, `videoId`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::broll::BrollStyle;
use crate::processed::{ProcessedVideoRecord, ProcessingStatus};
use crate::video::VideoId;

/// Successful upload response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessResponse {
    pub success: bool,
    #[serde(rename = "videoUrl")]
    pub video_url: String,
    #[serde(rename = "videoId")]
    pub video_id: VideoId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<String>,
}

impl ProcessResponse {
    pub fn new(video_id: VideoId, video_url: impl Into<String>, captions: Option<String>) -> Self {
        Self {
            success: true,
            video_url: video_url.into(),
            video_id,
            captions,
        }
    }
}

/// Status lookup response. Absent fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoStatusResponse {
    pub url: Option<String>,
    pub captions: Option<String>,
    #[schemars(with = "Option<String>")]
    pub status: Option<ProcessingStatus>,
}

impl VideoStatusResponse {
    /// Status of an upload with no `processed_videos` row.
    pub fn untracked(url: Option<String>) -> Self {
        Self {
            url,
            captions: None,
            status: None,
        }
    }
}

impl From<ProcessedVideoRecord> for VideoStatusResponse {
    fn from(record: ProcessedVideoRecord) -> Self {
        Self {
            url: record.url,
            captions: record.captions,
            status: record.status,
        }
    }
}

/// Error body: `{ "error": ..., "details"?: ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Selector entry for the B-roll catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BrollOption {
    pub value: String,
    pub label: String,
}

impl From<BrollStyle> for BrollOption {
    fn from(style: BrollStyle) -> Self {
        Self {
            value: style.as_str().to_string(),
            label: style.label().to_string(),
        }
    }
}
