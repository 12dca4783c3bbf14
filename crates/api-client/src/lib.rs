//! Authenticated HTTP client for the Cookbook backend
//!
//! Every call goes through one pipeline that callers never see:
//!
//! - **Bracket-notation encoding**: structured bodies and filters are sent as
//!   `application/x-www-form-urlencoded` with `key[]=a&key[]=b` arrays
//! - **Bearer injection**: the stored access token is attached to each request
//! - **Token persistence**: privileged login responses update the store
//! - **Refresh and replay**: a 401 for a missing or invalid access token
//!   triggers one credential refresh and one replay of the same request
//! - **Hard logout**: a rejected refresh credential wipes local state and
//!   sends the application to the sign-in entry point
//! - **Request correlation**: an `X-Request-ID` per logical call
//!
//! # Example
//!
//! ```rust,no_run
//! use cookbook_api_client::{ClientConfig, CookbookClient, RecipeFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CookbookClient::with_config(ClientConfig::from_env()?)?;
//!
//!     client
//!         .auth()
//!         .login(&serde_json::json!({"email": "chef@example.com", "password": "secret"}))
//!         .await?;
//!
//!     let recipes = client
//!         .recipes()
//!         .list(&RecipeFilter::default().category("dessert"))
//!         .await?;
//!     println!("{}", recipes.body);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod codec;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod navigation;
pub mod request;
pub mod store;
pub mod transport;

pub use client::{CookbookClient, CookbookClientBuilder, WeakClient};
pub use config::{ClientConfig, Environment};
pub use endpoints::RecipeFilter;
pub use error::{ApiError, ApiResult};
pub use middleware::{RefreshError, RefreshPolicy};
pub use request::{ApiResponse, Body, MultipartPayload, RequestDescriptor, RetryContext};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::{CookbookClient, WeakClient};
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::{
        AuthApi, BookmarksApi, CategoriesApi, LikersApi, ProfilesApi, RecipeFilter, RecipesApi,
        VideosApi,
    };
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::middleware::{AuthSession, RefreshAction, RefreshError, RefreshPolicy};
    pub use crate::navigation::{LogNavigator, Navigator, RecordingNavigator};
    pub use crate::request::{ApiResponse, Body, MultipartPayload};
    pub use crate::store::{CredentialStore, DurableCredentialStore, MemoryCredentialStore};
}
