//! S3-compatible object store.
//!
//! Targets Supabase Storage's S3 endpoint by default, but works against any
//! S3 API (R2, MinIO) given an explicit endpoint.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::keys::{validate_key, PublicUrlBuilder, DEFAULT_BUCKET};
use crate::traits::ObjectStore;

/// Configuration for the S3 object store.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region
    pub region: String,
    /// Base for public object URLs (bucket and key are appended)
    pub public_base_url: String,
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl S3Config {
    /// Create config from environment variables.
    ///
    /// `STORAGE_ENDPOINT_URL` and `STORAGE_PUBLIC_BASE_URL` fall back to the
    /// Supabase Storage paths under `SUPABASE_URL`.
    pub fn from_env() -> StorageResult<Self> {
        let supabase_url = env_non_empty("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string());

        let endpoint_url = env_non_empty("STORAGE_ENDPOINT_URL")
            .or_else(|| supabase_url.as_ref().map(|u| format!("{}/storage/v1/s3", u)))
            .ok_or_else(|| {
                StorageError::config_error("STORAGE_ENDPOINT_URL or SUPABASE_URL not set")
            })?;

        let public_base_url = env_non_empty("STORAGE_PUBLIC_BASE_URL")
            .or_else(|| {
                supabase_url
                    .as_ref()
                    .map(|u| format!("{}/storage/v1/object/public", u))
            })
            .ok_or_else(|| {
                StorageError::config_error("STORAGE_PUBLIC_BASE_URL or SUPABASE_URL not set")
            })?;

        Ok(Self {
            endpoint_url,
            access_key_id: env_non_empty("STORAGE_ACCESS_KEY_ID")
                .ok_or_else(|| StorageError::config_error("STORAGE_ACCESS_KEY_ID not set"))?,
            secret_access_key: env_non_empty("STORAGE_SECRET_ACCESS_KEY")
                .ok_or_else(|| StorageError::config_error("STORAGE_SECRET_ACCESS_KEY not set"))?,
            bucket_name: env_non_empty("STORAGE_BUCKET")
                .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            region: env_non_empty("STORAGE_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            public_base_url,
        })
    }

    pub fn public_urls(&self) -> StorageResult<PublicUrlBuilder> {
        PublicUrlBuilder::new(&self.public_base_url, self.bucket_name.clone())
    }
}

/// Object store backed by an S3-compatible bucket.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    urls: PublicUrlBuilder,
}

impl S3ObjectStore {
    /// Create a new store from configuration.
    pub fn new(config: S3Config) -> StorageResult<Self> {
        let urls = config.public_urls()?;

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "vboost-storage",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        info!(
            endpoint = %config.endpoint_url,
            bucket = %config.bucket_name,
            "Configured S3 object store"
        );

        Ok(Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
            urls,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Self::new(S3Config::from_env()?)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        validate_key(key)?;
        debug!("Uploading {} bytes to {}/{}", data.len(), self.bucket, key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(format!("{}: {}", key, e)))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> StorageResult<String> {
        self.urls.url_for(key)
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("S3 connectivity check failed: {}", e)))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
