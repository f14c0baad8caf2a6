//! Object store abstraction.

use async_trait::async_trait;

use crate::error::StorageResult;

/// Key-value store for processed artifacts.
///
/// Implementations must make an object readable at `public_url(key)` once
/// `put_object(key, ..)` has returned `Ok`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`.
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Resolve the publicly retrievable URL for `key`.
    fn public_url(&self, key: &str) -> StorageResult<String>;

    /// Check that the backing bucket is reachable.
    async fn check_connectivity(&self) -> StorageResult<()>;

    /// Short backend name for logs and readiness output.
    fn backend_name(&self) -> &'static str;
}
