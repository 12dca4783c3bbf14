//! Bookmarks endpoints

use super::{item_path, user_path};
use crate::client::CookbookClient;
use crate::error::ApiResult;
use crate::request::{ApiResponse, Body};
use serde::Serialize;

/// Base path of the bookmark resource
pub const BOOKMARK_PATH: &str = "/bookmark";

/// Bookmarks API interface
#[derive(Clone)]
pub struct BookmarksApi {
    client: CookbookClient,
}

impl BookmarksApi {
    /// Create a new bookmarks API interface
    pub(crate) fn new(client: CookbookClient) -> Self {
        Self { client }
    }

    /// List bookmarks
    ///
    /// GET /bookmark, with `filter` as the query string when non-empty.
    pub async fn list<F: Serialize + ?Sized>(&self, filter: &F) -> ApiResult<ApiResponse> {
        self.client.get_filtered(BOOKMARK_PATH, filter).await
    }

    /// GET /bookmark/user/{id}
    pub async fn by_user(&self, user_id: &str) -> ApiResult<ApiResponse> {
        self.client.get(&user_path(BOOKMARK_PATH, user_id)).await
    }

    /// POST /bookmark
    pub async fn create<B: Serialize + ?Sized>(&self, bookmark: &B) -> ApiResult<ApiResponse> {
        self.client.post(BOOKMARK_PATH, Body::json(bookmark)?).await
    }

    /// DELETE /bookmark/{id}
    pub async fn delete(&self, bookmark_id: &str) -> ApiResult<ApiResponse> {
        self.client.delete(&item_path(BOOKMARK_PATH, bookmark_id)).await
    }
}
