//! Principal resolution.
//!
//! Uploads are attributed to the caller when a valid bearer token is
//! presented. Absence of a principal is never an error for callers.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::PostgrestConfig;
use crate::error::{MetadataError, MetadataResult};

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    #[serde(rename = "id")]
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Resolves the current principal from a bearer token.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// `Ok(None)` for unknown, expired, or rejected tokens.
    async fn resolve(&self, token: &str) -> MetadataResult<Option<Principal>>;

    fn backend_name(&self) -> &'static str;
}

/// Supabase GoTrue resolver (`GET /auth/v1/user`).
#[derive(Clone)]
pub struct SupabaseAuth {
    http: Client,
    user_url: String,
    api_key: String,
}

impl SupabaseAuth {
    pub fn new(config: &PostgrestConfig) -> MetadataResult<Self> {
        Ok(Self {
            http: config.http_client()?,
            user_url: format!("{}/user", config.auth_url()),
            api_key: config.service_role_key.clone(),
        })
    }
}

#[async_trait]
impl PrincipalResolver for SupabaseAuth {
    async fn resolve(&self, token: &str) -> MetadataResult<Option<Principal>> {
        let response = self
            .http
            .get(&self.user_url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                debug!("Bearer token rejected by auth service");
                Ok(None)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(MetadataError::from_http_status(
                    status.as_u16(),
                    format!("{} failed: {}", self.user_url, body),
                ))
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}

/// Treats every caller as anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousPrincipals;

#[async_trait]
impl PrincipalResolver for AnonymousPrincipals {
    async fn resolve(&self, _token: &str) -> MetadataResult<Option<Principal>> {
        Ok(None)
    }

    fn backend_name(&self) -> &'static str {
        "anonymous"
    }
}
