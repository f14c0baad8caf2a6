//! Application state.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use vboost_metadata::{
    AnonymousPrincipals, MemoryMetadataStore, MetadataError, MetadataStore, PostgrestClient,
    PostgrestConfig, PostgrestMetadataStore, PrincipalResolver, SupabaseAuth,
};
use vboost_processor::{create_processor, ProcessorConfig, ProcessorError, VideoProcessor};
use vboost_storage::{MemoryObjectStore, ObjectStore, PublicUrlBuilder, S3ObjectStore, StorageError};

use crate::config::{ApiConfig, AuthMode, MetadataBackend, StorageBackend};

/// Failure to wire a selected backend at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("storage backend: {0}")]
    Storage(#[from] StorageError),

    #[error("metadata backend: {0}")]
    Metadata(#[from] MetadataError),

    #[error("processor: {0}")]
    Processor(#[from] ProcessorError),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<dyn ObjectStore>,
    pub metadata: Arc<dyn MetadataStore>,
    pub processor: Arc<dyn VideoProcessor>,
    pub principals: Arc<dyn PrincipalResolver>,
}

impl AppState {
    /// Assemble state from already-constructed clients.
    pub fn new(
        config: ApiConfig,
        storage: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
        processor: Arc<dyn VideoProcessor>,
        principals: Arc<dyn PrincipalResolver>,
    ) -> Self {
        Self {
            config,
            storage,
            metadata,
            processor,
            principals,
        }
    }

    /// Construct every client from the environment per the backend selection.
    pub fn from_config(config: ApiConfig) -> Result<Self, StartupError> {
        let backends = config.backends;

        let storage: Arc<dyn ObjectStore> = match backends.storage {
            StorageBackend::S3 => Arc::new(S3ObjectStore::from_env()?),
            StorageBackend::Memory => Arc::new(MemoryObjectStore::new(PublicUrlBuilder::from_env()?)),
        };

        // Only real metadata/auth backends read Supabase credentials
        let metadata: Arc<dyn MetadataStore> = match backends.metadata {
            MetadataBackend::Postgrest => {
                Arc::new(PostgrestMetadataStore::new(PostgrestClient::from_env()?))
            }
            MetadataBackend::Memory => Arc::new(MemoryMetadataStore::new()),
        };

        let principals: Arc<dyn PrincipalResolver> = match backends.auth {
            AuthMode::Supabase => Arc::new(SupabaseAuth::new(&PostgrestConfig::from_env()?)?),
            AuthMode::Anonymous => Arc::new(AnonymousPrincipals),
        };

        let processor = create_processor(&ProcessorConfig::from_env()?)?;

        info!(
            storage = storage.backend_name(),
            metadata = metadata.backend_name(),
            auth = principals.backend_name(),
            processor = processor.backend_name(),
            "Backends configured"
        );

        Ok(Self::new(config, storage, metadata, processor, principals))
    }
}
