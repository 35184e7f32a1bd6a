//! Application configuration, loaded once from the environment at startup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    MissingRequired(String),

    #[error("invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Complete application configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub streaming: StreamingCredentials,
    pub catalog: CatalogCredentials,
    pub store: StoreConfig,
    pub queue: QueueConfig,
    pub sampler: SamplerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            streaming: StreamingCredentials::from_env()?,
            catalog: CatalogCredentials::from_env()?,
            store: StoreConfig::from_env()?,
            queue: QueueConfig::from_env()?,
            sampler: SamplerConfig::from_env(),
        })
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Streaming service client-credentials OAuth identity.
#[derive(Clone)]
pub struct StreamingCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl StreamingCredentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = require_env("STREAMING_CLIENT_ID")?;
        let client_secret = require_env("STREAMING_CLIENT_SECRET")?;

        if client_id.is_empty() || client_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "STREAMING_CLIENT_ID/STREAMING_CLIENT_SECRET".to_string(),
                message: "streaming credentials cannot be empty".to_string(),
            });
        }

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

/// Discography catalog bearer token. Absence is a startup-time configuration
/// error, not something the Catalog Client discovers mid-request.
#[derive(Clone)]
pub struct CatalogCredentials {
    pub api_token: String,
}

impl CatalogCredentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = require_env("CATALOG_API_TOKEN")?;
        if api_token.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "CATALOG_API_TOKEN".to_string(),
                message: "catalog API token cannot be empty".to_string(),
            });
        }
        Ok(Self { api_token })
    }
}

/// Key/value job store, addressed as an HTTP REST endpoint (Upstash-style
/// `KV_REST_API_URL`/`KV_REST_API_TOKEN` pair) rather than a raw TCP connection.
#[derive(Clone)]
pub struct StoreConfig {
    pub rest_api_url: String,
    pub rest_api_token: String,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let rest_api_url = require_env("KV_REST_API_URL")?;
        let rest_api_token = require_env("KV_REST_API_TOKEN")?;
        if !rest_api_url.starts_with("http://") && !rest_api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "KV_REST_API_URL".to_string(),
                message: "must be an http(s) URL".to_string(),
            });
        }
        Ok(Self {
            rest_api_url,
            rest_api_token,
        })
    }
}

/// Background queue credentials: a token to publish jobs, and the shared
/// signing key the queue service uses to sign its callback into `/worker`.
#[derive(Clone)]
pub struct QueueConfig {
    pub queue_token: String,
    pub signing_key: String,
}

impl QueueConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            queue_token: require_env("QUEUE_TOKEN")?,
            signing_key: require_env("QUEUE_SIGNING_KEY")?,
        })
    }
}

#[derive(Clone, Copy)]
pub struct SamplerConfig {
    pub sample_size: usize,
}

impl SamplerConfig {
    pub fn from_env() -> Self {
        Self {
            sample_size: env_or_default("CATALOG_SAMPLE_SIZE", "60")
                .parse()
                .unwrap_or(60),
        }
    }
}

pub fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingRequired(key.to_string()))
}

pub fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
