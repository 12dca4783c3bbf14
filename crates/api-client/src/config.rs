//! Configuration for the Cookbook API client
//!
//! Read once from the environment at startup, with builder-style overrides.

use crate::error::{ApiError, ApiResult};
use crate::middleware::refresh::RefreshPolicy;
use cookbook_core::duration::{parse_duration, serde_human};
use cookbook_core::storage::StorageConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Backend origin used by local development
const DEFAULT_DEVELOPMENT_URL: &str = "http://localhost:5000";

/// Request timeout used when none is configured
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development backend
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    #[default]
    Production,
}

impl Environment {
    /// Parse from environment variable
    pub fn from_env() -> Self {
        match env::var("COOKBOOK_ENV")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://api.example.com`
    pub base_url: String,
    /// Timeout applied to each transport call
    #[serde(with = "serde_human")]
    pub timeout: Duration,
    /// Location of the durable credential file (platform default when unset)
    pub storage_path: Option<PathBuf>,
    /// How concurrent credential refreshes are handled
    pub refresh_policy: RefreshPolicy,
    /// Keep and send cookies, which carry the refresh token
    pub with_credentials: bool,
    /// Current environment
    pub environment: Environment,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DEVELOPMENT_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            storage_path: None,
            refresh_policy: RefreshPolicy::default(),
            with_credentials: true,
            environment: Environment::default(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `COOKBOOK_ENV`: Environment (development/staging/production)
    /// - `COOKBOOK_BACKEND_URL`: Backend origin (required outside development)
    /// - `COOKBOOK_REQUEST_TIMEOUT`: Request timeout as a duration string (`30s`, `1m30s`)
    /// - `COOKBOOK_STORAGE_PATH`: Credential file location
    /// - `COOKBOOK_REFRESH_POLICY`: `single-flight` or `independent`
    pub fn from_env() -> ApiResult<Self> {
        let environment = Environment::from_env();

        let base_url = match env::var("COOKBOOK_BACKEND_URL") {
            Ok(url) => url,
            Err(_) if environment == Environment::Development => {
                DEFAULT_DEVELOPMENT_URL.to_string()
            }
            Err(_) => return Err(ApiError::missing_env("COOKBOOK_BACKEND_URL")),
        };

        Self::from_env_with_base_url(base_url)
    }

    /// Create configuration from environment variables with a fixed backend origin
    ///
    /// `COOKBOOK_BACKEND_URL` is ignored; every other variable read by
    /// [`ClientConfig::from_env`] still applies and still fails when invalid.
    pub fn from_env_with_base_url(base_url: impl Into<String>) -> ApiResult<Self> {
        let environment = Environment::from_env();

        let timeout = match env::var("COOKBOOK_REQUEST_TIMEOUT") {
            Ok(raw) => parse_duration(&raw).map_err(|e| ApiError::config(e.message))?,
            Err(_) => DEFAULT_TIMEOUT,
        };

        let storage_path = env::var("COOKBOOK_STORAGE_PATH").ok().map(PathBuf::from);

        let refresh_policy = match env::var("COOKBOOK_REFRESH_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => RefreshPolicy::default(),
        };

        Ok(Self {
            base_url: base_url.into(),
            timeout,
            storage_path,
            refresh_policy,
            with_credentials: true,
            environment,
        })
    }

    /// Create development configuration (local backend)
    #[must_use]
    pub fn development() -> Self {
        Self {
            base_url: DEFAULT_DEVELOPMENT_URL.to_string(),
            timeout: Duration::from_secs(10),
            environment: Environment::Development,
            ..Self::default()
        }
    }

    /// Create staging configuration for a backend origin
    #[must_use]
    pub fn staging(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(15),
            environment: Environment::Staging,
            ..Self::default()
        }
    }

    /// Create production configuration for a backend origin
    #[must_use]
    pub fn production(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            environment: Environment::Production,
            ..Self::default()
        }
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set the credential file location
    #[must_use]
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    /// Builder-style method to set the refresh policy
    #[must_use]
    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Timeout in whole milliseconds
    #[must_use]
    pub fn timeout_millis(&self) -> u128 {
        self.timeout.as_millis()
    }

    /// Storage configuration for the durable credential store
    #[must_use]
    pub fn storage_config(&self) -> StorageConfig {
        self.storage_path
            .clone()
            .map_or_else(StorageConfig::default, StorageConfig::at)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}
