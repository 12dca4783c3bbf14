//! Transport layer: executes one request descriptor against the backend origin

use crate::codec::{self, FORM_CONTENT_TYPE};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::request::{ApiResponse, Body, RequestDescriptor};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Url};
use std::time::{Duration, Instant};
use tracing::debug;

/// Executes a single HTTP exchange
///
/// Any status code is a completed exchange and comes back as `Ok`; only
/// network-level failures are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request once
    async fn send(&self, request: &RequestDescriptor) -> ApiResult<ApiResponse>;
}

/// `reqwest`-backed transport bound to one origin
#[derive(Clone)]
pub struct HttpTransport {
    inner: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport from client configuration
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("cookbook-api-client/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .timeout(config.timeout)
            .cookie_store(config.with_credentials)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    /// Absolute URL for a descriptor
    pub fn url_for(&self, request: &RequestDescriptor) -> ApiResult<Url> {
        let raw = format!("{}{}", self.base_url, request.path_and_query());
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> ApiResult<ApiResponse> {
        let url = self.url_for(request)?;
        let mut builder = self
            .inner
            .request(request.method.clone(), url)
            .headers(request.headers.clone());

        // Descriptors sent without the interceptor may still carry a structured body
        builder = match codec::encode_body(request.body.clone()) {
            Body::Empty | Body::Structured(_) => builder,
            Body::Form(form) => builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(form),
            Body::Multipart(payload) => builder.multipart(payload.to_form()?),
        };

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout)
            } else {
                ApiError::Request(e)
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis(),
            "Transport exchange completed"
        );

        Ok(ApiResponse::from_bytes(status, headers, &bytes))
    }
}
