//! Profile endpoints

use super::item_path;
use crate::client::CookbookClient;
use crate::error::ApiResult;
use crate::request::{ApiResponse, Body};
use serde::Serialize;

/// Base path of the profile resource
pub const PROFILE_PATH: &str = "/profile";

/// Profiles API interface
#[derive(Clone)]
pub struct ProfilesApi {
    client: CookbookClient,
}

impl ProfilesApi {
    /// Create a new profiles API interface
    pub(crate) fn new(client: CookbookClient) -> Self {
        Self { client }
    }

    /// PUT /profile/{id}
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        profile_id: &str,
        profile: &B,
    ) -> ApiResult<ApiResponse> {
        self.client
            .put(&item_path(PROFILE_PATH, profile_id), Body::json(profile)?)
            .await
    }
}
