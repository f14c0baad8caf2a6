//! Object storage for processed videos.
//!
//! This crate provides:
//! - The `ObjectStore` trait used by the upload flow
//! - An S3-compatible client (Supabase Storage's S3 endpoint, R2, MinIO)
//! - An in-memory store for development and tests
//! - Object key and public URL helpers

pub mod error;
pub mod keys;
pub mod memory;
pub mod s3;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use keys::{
    processed_video_key, validate_key, PublicUrlBuilder, DEFAULT_BUCKET, LOCAL_PUBLIC_BASE_URL,
    VIDEO_CONTENT_TYPE,
};
pub use memory::{MemoryObjectStore, StoredObject};
pub use s3::{S3Config, S3ObjectStore};
pub use traits::ObjectStore;
