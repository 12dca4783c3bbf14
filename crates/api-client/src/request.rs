//! Outgoing request and response types shared by every pipeline stage

use crate::error::{ApiError, ApiResult};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// One outgoing call
///
/// Cloneable so that the exact same call can be resubmitted after a credential
/// refresh.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: Method,
    /// Path relative to the backend origin, starting with `/`
    pub path: String,
    /// Already-encoded query string, without the leading `?`
    pub query: Option<String>,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Body,
}

impl RequestDescriptor {
    /// Create a descriptor with no query, headers or body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: Body::Empty,
        }
    }

    /// Shorthand for a GET descriptor
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Attach an encoded query string; empty strings are ignored
    #[must_use]
    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    /// Attach a body
    #[must_use]
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Path plus query, as it appears on the wire
    pub fn path_and_query(&self) -> String {
        match self.query {
            Some(ref query) => format!("{}?{query}", self.path),
            None => self.path.clone(),
        }
    }
}

/// Request body
#[derive(Debug, Clone, Default)]
pub enum Body {
    /// No body
    #[default]
    Empty,
    /// Structured value, encoded as a bracket-notation form before sending
    Structured(Value),
    /// Encoded `application/x-www-form-urlencoded` body
    Form(String),
    /// Multipart payload, sent as-is
    Multipart(MultipartPayload),
}

impl Body {
    /// Build a structured body from any serializable value
    pub fn json<T: Serialize + ?Sized>(value: &T) -> ApiResult<Self> {
        Ok(Self::Structured(serde_json::to_value(value)?))
    }

    /// Check whether the body is a multipart payload
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

impl From<MultipartPayload> for Body {
    fn from(payload: MultipartPayload) -> Self {
        Self::Multipart(payload)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// Owned multipart form that can be rebuilt for every send
#[derive(Debug, Clone, Default)]
pub struct MultipartPayload {
    parts: Vec<MultipartPart>,
}

/// One field of a multipart form
#[derive(Debug, Clone)]
pub struct MultipartPart {
    /// Field name
    pub name: String,
    /// Field content
    pub content: PartContent,
}

/// Content of a multipart field
#[derive(Debug, Clone)]
pub enum PartContent {
    /// Plain text value
    Text(String),
    /// Binary file
    File {
        /// Raw bytes
        bytes: Vec<u8>,
        /// File name reported to the server
        file_name: Option<String>,
        /// MIME type, e.g. `video/mp4`
        mime: Option<String>,
    },
}

impl MultipartPayload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            content: PartContent::Text(value.into()),
        });
        self
    }

    /// Add a file field
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        mime: Option<&str>,
    ) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            content: PartContent::File {
                bytes,
                file_name: Some(file_name.into()),
                mime: mime.map(str::to_string),
            },
        });
        self
    }

    /// Fields in insertion order
    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    /// Build a fresh `reqwest` form
    pub fn to_form(&self) -> ApiResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();

        for part in &self.parts {
            form = match part.content {
                PartContent::Text(ref value) => form.text(part.name.clone(), value.clone()),
                PartContent::File {
                    ref bytes,
                    ref file_name,
                    ref mime,
                } => {
                    let mut file = reqwest::multipart::Part::bytes(bytes.clone());
                    if let Some(name) = file_name {
                        file = file.file_name(name.clone());
                    }
                    if let Some(mime) = mime {
                        file = file
                            .mime_str(mime)
                            .map_err(|_| ApiError::InvalidHeader(format!("content-type {mime}")))?;
                    }
                    form.part(part.name.clone(), file)
                }
            };
        }

        Ok(form)
    }
}

/// Retry bookkeeping for one logical call
///
/// Threaded through the pipeline next to the descriptor. Once `retried` is
/// set the call can no longer trigger a credential refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryContext {
    retried: bool,
}

impl RetryContext {
    /// Context for a call that has not been replayed
    pub fn fresh() -> Self {
        Self::default()
    }

    /// Context for a call whose single replay has been consumed
    pub fn retried() -> Self {
        Self { retried: true }
    }

    /// Whether the replay has been consumed
    #[must_use]
    pub fn is_retried(self) -> bool {
        self.retried
    }
}

/// Completed HTTP exchange, success or not
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body parsed as JSON; `Null` when empty, a JSON string when not valid JSON
    pub body: Value,
}

impl ApiResponse {
    /// Build a response from raw body bytes
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, bytes: &[u8]) -> Self {
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
        };

        Self {
            status,
            headers,
            body,
        }
    }

    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The `data` envelope of the backend's responses, if any
    pub fn data(&self) -> Option<&Value> {
        self.body.get("data")
    }

    /// `data.message`, if present and a string
    pub fn message(&self) -> Option<&str> {
        self.data()
            .and_then(|data| data.get("message"))
            .and_then(Value::as_str)
    }

    /// Deserialize the whole body
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Convert a non-2xx response into the error handed to callers
    pub fn into_error(self) -> ApiError {
        let message = self
            .message()
            .map(str::to_string)
            .or_else(|| self.body.as_str().map(str::to_string))
            .or_else(|| self.status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "Unknown error".to_string());

        ApiError::api_response(self.status.as_u16(), message, self.body)
    }
}
