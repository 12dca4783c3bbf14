//! Video endpoints
//!
//! Uploads are usually multipart: build a [`MultipartPayload`] with the file
//! and its fields and pass it as the body. Structured bodies are encoded as
//! forms like everywhere else.
//!
//! [`MultipartPayload`]: crate::request::MultipartPayload

use super::item_path;
use crate::client::CookbookClient;
use crate::error::ApiResult;
use crate::request::{ApiResponse, Body};

/// Base path of the video resource
pub const VIDEO_PATH: &str = "/video";

/// Videos API interface
#[derive(Clone)]
pub struct VideosApi {
    client: CookbookClient,
}

impl VideosApi {
    /// Create a new videos API interface
    pub(crate) fn new(client: CookbookClient) -> Self {
        Self { client }
    }

    /// POST /video
    pub async fn create(&self, video: impl Into<Body>) -> ApiResult<ApiResponse> {
        self.client.post(VIDEO_PATH, video.into()).await
    }

    /// PUT /video/{id}
    pub async fn update(&self, video_id: &str, video: impl Into<Body>) -> ApiResult<ApiResponse> {
        self.client
            .put(&item_path(VIDEO_PATH, video_id), video.into())
            .await
    }

    /// DELETE /video/{id}
    pub async fn delete(&self, video_id: &str) -> ApiResult<ApiResponse> {
        self.client.delete(&item_path(VIDEO_PATH, video_id)).await
    }
}
