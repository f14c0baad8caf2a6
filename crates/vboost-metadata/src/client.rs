//! PostgREST client.
//!
//! Talks to Supabase's REST layer with the service-role key. Requests are
//! traced and metered per operation; there is no retry.

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info_span, Instrument};

use crate::error::{MetadataError, MetadataResult};
use crate::metrics::record_request;

// =============================================================================
// Configuration
// =============================================================================

/// Supabase REST/auth configuration.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Project URL, e.g. `https://<ref>.supabase.co`
    pub supabase_url: String,
    /// Service-role key sent as `apikey` and bearer token
    pub service_role_key: String,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl PostgrestConfig {
    pub fn new(supabase_url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        Self {
            supabase_url: supabase_url.into().trim_end_matches('/').to_string(),
            service_role_key: service_role_key.into(),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> MetadataResult<Self> {
        let supabase_url = std::env::var("SUPABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| MetadataError::config_error("SUPABASE_URL not set"))?;

        let service_role_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| MetadataError::config_error("SUPABASE_SERVICE_ROLE_KEY not set"))?;

        let connect_timeout_secs: u64 = std::env::var("METADATA_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            ..Self::new(supabase_url.trim(), service_role_key.trim())
        })
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.supabase_url)
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.supabase_url)
    }

    pub(crate) fn http_client(&self) -> MetadataResult<Client> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("vboost-metadata/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MetadataError::Network)
    }
}

// =============================================================================
// Client
// =============================================================================

/// PostgREST client for single-row inserts and id lookups.
#[derive(Clone)]
pub struct PostgrestClient {
    http: Client,
    config: PostgrestConfig,
    rest_url: String,
}

impl PostgrestClient {
    pub fn new(config: PostgrestConfig) -> MetadataResult<Self> {
        let http = config.http_client()?;
        let rest_url = config.rest_url();
        Ok(Self {
            http,
            config,
            rest_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> MetadataResult<Self> {
        Self::new(PostgrestConfig::from_env()?)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.service_role_key)
            .bearer_auth(&self.config.service_role_key)
    }

    /// Insert one row and return the stored representation.
    pub async fn insert_row<T, R>(&self, table: &str, row: &T) -> MetadataResult<R>
    where
        T: Serialize + Sync + ?Sized,
        R: DeserializeOwned + Send,
    {
        let url = self.table_url(table);

        self.execute_request("insert", table, None, async {
            let response = self
                .authorized(self.http.post(&url))
                .header("Prefer", "return=representation")
                .json(row)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Self::handle_error_response(status, &url, response).await);
            }

            let rows: Vec<R> = response.json().await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| MetadataError::invalid_response(format!("{} returned no rows", url)))
        })
        .await
    }

    /// Select the row whose `id` column equals `id`.
    pub async fn select_by_id<R>(&self, table: &str, id: &str) -> MetadataResult<Option<R>>
    where
        R: DeserializeOwned + Send,
    {
        let url = self.table_url(table);

        self.execute_request("select_by_id", table, Some(id), async {
            let response = self
                .authorized(self.http.get(&url))
                .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())])
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::BAD_REQUEST {
                let body = response.text().await.unwrap_or_default();
                // 22P02: Postgres rejected the id as a malformed uuid, so no row can match.
                if body.contains("22P02") {
                    debug!("{} rejected id {} as malformed", table, id);
                    return Ok(None);
                }
                return Err(MetadataError::from_http_status(
                    status.as_u16(),
                    format!("{} failed: {}", url, body),
                ));
            }
            if !status.is_success() {
                return Err(Self::handle_error_response(status, &url, response).await);
            }

            let rows: Vec<R> = response.json().await?;
            Ok(rows.into_iter().next())
        })
        .await
    }

    /// Cheap read against `table` to verify reachability and credentials.
    pub async fn ping(&self, table: &str) -> MetadataResult<()> {
        let url = self.table_url(table);

        self.execute_request("ping", table, None, async {
            let response = self
                .authorized(self.http.get(&url))
                .query(&[("select", "id"), ("limit", "1")])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Self::handle_error_response(status, &url, response).await);
            }
            Ok(())
        })
        .await
    }

    async fn execute_request<T, F>(
        &self,
        operation: &str,
        table: &str,
        row_id: Option<&str>,
        fut: F,
    ) -> MetadataResult<T>
    where
        F: std::future::Future<Output = MetadataResult<T>>,
    {
        let span = if let Some(id) = row_id {
            info_span!("postgrest_request", operation = %operation, table = %table, row_id = %id)
        } else {
            info_span!("postgrest_request", operation = %operation, table = %table)
        };

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(
        status: StatusCode,
        url: &str,
        response: reqwest::Response,
    ) -> MetadataError {
        let body = response.text().await.unwrap_or_default();
        MetadataError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}

// =============================================================================
// Tests
// =============================================================================
