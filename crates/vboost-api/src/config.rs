//! API configuration.

use thiserror::Error;

/// Invalid startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not supported (expected one of: {expected})")]
    UnknownChoice {
        var: &'static str,
        value: String,
        expected: String,
    },
}

/// Object store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Memory,
}

/// Metadata store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataBackend {
    Postgrest,
    Memory,
}

/// Principal resolution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Supabase,
    Anonymous,
}

/// Explicit backend selection. A selected real backend with missing
/// credentials fails at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendSelection {
    pub storage: StorageBackend,
    pub metadata: MetadataBackend,
    pub auth: AuthMode,
}

impl Default for BackendSelection {
    fn default() -> Self {
        Self {
            storage: StorageBackend::S3,
            metadata: MetadataBackend::Postgrest,
            auth: AuthMode::Supabase,
        }
    }
}

impl BackendSelection {
    /// All in-process backends, for development and tests.
    pub fn in_memory() -> Self {
        Self {
            storage: StorageBackend::Memory,
            metadata: MetadataBackend::Memory,
            auth: AuthMode::Anonymous,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            storage: env_choice(
                "STORAGE_BACKEND",
                defaults.storage,
                &[("s3", StorageBackend::S3), ("memory", StorageBackend::Memory)],
            )?,
            metadata: env_choice(
                "METADATA_BACKEND",
                defaults.metadata,
                &[
                    ("postgrest", MetadataBackend::Postgrest),
                    ("memory", MetadataBackend::Memory),
                ],
            )?,
            auth: env_choice(
                "AUTH_MODE",
                defaults.auth,
                &[("supabase", AuthMode::Supabase), ("anonymous", AuthMode::Anonymous)],
            )?,
        })
    }
}

fn env_choice<T: Copy>(
    var: &'static str,
    default: T,
    choices: &[(&'static str, T)],
) -> Result<T, ConfigError> {
    let value = match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_lowercase(),
        _ => return Ok(default),
    };

    choices
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, choice)| *choice)
        .ok_or_else(|| ConfigError::UnknownChoice {
            var,
            value,
            expected: choices
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size (uploads are buffered in memory)
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    pub backends: BackendSelection,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 500 * 1024 * 1024, // 500MB, same ceiling as the processor
            environment: "development".to_string(),
            metrics_enabled: true,
            backends: BackendSelection::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
            backends: BackendSelection::from_env()?,
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}
