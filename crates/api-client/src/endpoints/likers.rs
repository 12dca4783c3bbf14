//! Likers endpoints

use super::{item_path, user_path};
use crate::client::CookbookClient;
use crate::error::ApiResult;
use crate::request::{ApiResponse, Body};
use serde::Serialize;

/// Base path of the liker resource
pub const LIKER_PATH: &str = "/liker";

/// Likers API interface
#[derive(Clone)]
pub struct LikersApi {
    client: CookbookClient,
}

impl LikersApi {
    /// Create a new likers API interface
    pub(crate) fn new(client: CookbookClient) -> Self {
        Self { client }
    }

    /// List likers
    ///
    /// GET /liker, with `filter` as the query string when non-empty.
    pub async fn list<F: Serialize + ?Sized>(&self, filter: &F) -> ApiResult<ApiResponse> {
        self.client.get_filtered(LIKER_PATH, filter).await
    }

    /// GET /liker/user/{id}
    pub async fn by_user(&self, user_id: &str) -> ApiResult<ApiResponse> {
        self.client.get(&user_path(LIKER_PATH, user_id)).await
    }

    /// POST /liker
    pub async fn create<B: Serialize + ?Sized>(&self, liker: &B) -> ApiResult<ApiResponse> {
        self.client.post(LIKER_PATH, Body::json(liker)?).await
    }

    /// DELETE /liker/{id}
    pub async fn delete(&self, liker_id: &str) -> ApiResult<ApiResponse> {
        self.client.delete(&item_path(LIKER_PATH, liker_id)).await
    }
}
