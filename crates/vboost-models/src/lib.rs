//! Shared data models for the VBoost backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video identifiers and uploaded video records (`videos` table)
//! - Processed video records and processing status (`processed_videos` table)
//! - The B-roll style catalogue offered to clients
//! - HTTP request/response wire types

pub mod api;
pub mod broll;
pub mod processed;
pub mod video;

// Re-export common types
pub use api::{BrollOption, ErrorResponse, ProcessResponse, VideoStatusResponse};
pub use broll::{normalize_broll, BrollStyle, BrollStyleParseError};
pub use processed::{ProcessedVideoRecord, ProcessingStatus};
pub use video::{NewVideoRecord, VideoId, VideoRecord};
