//! Category endpoints

use crate::client::CookbookClient;
use crate::error::ApiResult;
use crate::request::ApiResponse;

/// Base path of the category resource
pub const CATEGORY_PATH: &str = "/category";

/// Categories API interface
#[derive(Clone)]
pub struct CategoriesApi {
    client: CookbookClient,
}

impl CategoriesApi {
    /// Create a new categories API interface
    pub(crate) fn new(client: CookbookClient) -> Self {
        Self { client }
    }

    /// GET /category
    pub async fn list(&self) -> ApiResult<ApiResponse> {
        self.client.get(CATEGORY_PATH).await
    }
}
