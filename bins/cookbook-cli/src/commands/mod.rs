//! CLI command implementations

pub mod auth;
pub mod catalog;
pub mod token;

use anyhow::Result;
use cookbook_api_client::navigation::LogNavigator;
use cookbook_api_client::store::DurableCredentialStore;
use cookbook_api_client::{ClientConfig, CookbookClient};
use std::sync::Arc;

/// Resolve configuration from the environment, with an optional backend override
pub fn config(backend: Option<&str>) -> Result<ClientConfig> {
    let config = match backend {
        Some(url) => ClientConfig::from_env_with_base_url(url)?,
        None => ClientConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

/// Build a client over the durable credential store
pub fn client(backend: Option<&str>) -> Result<CookbookClient> {
    let config = config(backend)?;
    let store = DurableCredentialStore::new(config.storage_config())?;

    let client = CookbookClient::builder(config)
        .credential_store(Arc::new(store))
        .navigator(Arc::new(LogNavigator))
        .build()?;

    Ok(client)
}
