//! Access token storage
//!
//! The pipeline reads the access token synchronously before every request and
//! overwrites it when the backend hands out a fresh one for a privileged role.
//! Expiry is never tracked here; it is detected from responses.

use crate::error::ApiResult;
use cookbook_core::storage::{KeyValueStore, StorageConfig};
use std::sync::{PoisonError, RwLock};
use tracing::warn;

/// Key under which the access token is persisted
pub const ACCESS_TOKEN_KEY: &str = "@acc_token";

/// Synchronous access token storage
pub trait CredentialStore: Send + Sync {
    /// Current access token, if any
    fn get(&self) -> Option<String>;

    /// Replace the access token
    fn set(&self, token: &str);

    /// Wipe all client state held by this store, not only the token
    fn clear(&self);
}

/// Credential store persisted to disk, surviving restarts
pub struct DurableCredentialStore {
    storage: KeyValueStore,
}

impl DurableCredentialStore {
    /// Open the store at the given location
    pub fn new(config: StorageConfig) -> ApiResult<Self> {
        Ok(Self {
            storage: KeyValueStore::new(config)?,
        })
    }

    /// Open the store at the default platform location
    pub fn open_default() -> ApiResult<Self> {
        Self::new(StorageConfig::default())
    }

    /// Underlying key-value storage
    pub fn storage(&self) -> &KeyValueStore {
        &self.storage
    }
}

impl CredentialStore for DurableCredentialStore {
    fn get(&self) -> Option<String> {
        match self.storage.get(ACCESS_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read access token, treating as absent");
                None
            }
        }
    }

    fn set(&self, token: &str) {
        if let Err(e) = self.storage.set(ACCESS_TOKEN_KEY, token) {
            warn!(error = %e, "Failed to persist access token");
        }
    }

    fn clear(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to clear credential storage");
        }
    }
}

/// Process-local credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
