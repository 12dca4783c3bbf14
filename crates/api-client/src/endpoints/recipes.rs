//! Recipe endpoints

use super::{item_path, user_path};
use crate::client::CookbookClient;
use crate::error::ApiResult;
use crate::request::{ApiResponse, Body};
use serde::{Deserialize, Serialize};

/// Base path of the recipe resource
pub const RECIPE_PATH: &str = "/recipe";

/// Recipes API interface
#[derive(Clone)]
pub struct RecipesApi {
    client: CookbookClient,
}

impl RecipesApi {
    /// Create a new recipes API interface
    pub(crate) fn new(client: CookbookClient) -> Self {
        Self { client }
    }

    /// List recipes
    ///
    /// GET /recipe. `filter` may be a [`RecipeFilter`] or any serializable
    /// mapping; sequences are sent as `key[]=a&key[]=b`. An empty filter
    /// sends no query string.
    pub async fn list<F: Serialize + ?Sized>(&self, filter: &F) -> ApiResult<ApiResponse> {
        self.client.get_filtered(RECIPE_PATH, filter).await
    }

    /// GET /recipe/{id}
    pub async fn get(&self, recipe_id: &str) -> ApiResult<ApiResponse> {
        self.client.get(&item_path(RECIPE_PATH, recipe_id)).await
    }

    /// GET /recipe/user/{id}
    pub async fn by_user(&self, user_id: &str) -> ApiResult<ApiResponse> {
        self.client.get(&user_path(RECIPE_PATH, user_id)).await
    }

    /// POST /recipe
    pub async fn create<B: Serialize + ?Sized>(&self, recipe: &B) -> ApiResult<ApiResponse> {
        self.client.post(RECIPE_PATH, Body::json(recipe)?).await
    }

    /// PUT /recipe/{id}
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        recipe_id: &str,
        recipe: &B,
    ) -> ApiResult<ApiResponse> {
        self.client
            .put(&item_path(RECIPE_PATH, recipe_id), Body::json(recipe)?)
            .await
    }

    /// DELETE /recipe/{id}
    pub async fn delete(&self, recipe_id: &str) -> ApiResult<ApiResponse> {
        self.client.delete(&item_path(RECIPE_PATH, recipe_id)).await
    }
}

/// Common recipe filters
///
/// Unset fields are left out of the query entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Category identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Tags the recipe must carry
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    /// Title search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl RecipeFilter {
    /// Filter by category
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Require a tag
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Search by title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Paginate
    #[must_use]
    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }
}
