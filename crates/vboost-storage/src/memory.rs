//! In-memory object store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageResult;
use crate::keys::{validate_key, PublicUrlBuilder};
use crate::traits::ObjectStore;

/// A stored object and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Object store kept in process memory.
///
/// Public URLs are resolved with the same builder as the S3 backend, so a
/// memory-backed deployment still returns well-formed URLs.
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    urls: PublicUrlBuilder,
}

impl MemoryObjectStore {
    pub fn new(urls: PublicUrlBuilder) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            urls,
        }
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        validate_key(key)?;
        debug!("Storing {} bytes at {} (memory)", data.len(), key);

        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> StorageResult<String> {
        self.urls.url_for(key)
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
