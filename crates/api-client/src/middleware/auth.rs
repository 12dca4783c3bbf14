//! Request interceptor

use crate::codec;
use crate::error::{ApiError, ApiResult};
use crate::request::RequestDescriptor;
use crate::store::CredentialStore;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use std::sync::Arc;

/// Decorates every outgoing request before it reaches the transport
#[derive(Clone)]
pub struct AuthInterceptor {
    store: Arc<dyn CredentialStore>,
}

impl AuthInterceptor {
    /// Create an interceptor reading tokens from `store`
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Encode the body and attach `Authorization: Bearer <token>` when a token is stored
    pub fn apply(&self, mut request: RequestDescriptor) -> ApiResult<RequestDescriptor> {
        request.body = codec::encode_body(std::mem::take(&mut request.body));

        if let Some(token) = self.store.get() {
            request.headers.insert(AUTHORIZATION, bearer(&token)?);
        }

        Ok(request)
    }
}

/// Build a sensitive `Bearer` header value
pub fn bearer(token: &str) -> ApiResult<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ApiError::InvalidHeader(AUTHORIZATION.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Body;
    use crate::store::MemoryCredentialStore;
    use reqwest::Method;
    use serde_json::json;

    #[test]
    fn test_attaches_stored_token() {
        let interceptor = AuthInterceptor::new(Arc::new(MemoryCredentialStore::with_token("abc")));

        let request = interceptor.apply(RequestDescriptor::get("/recipe")).unwrap();
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
    }

    #[test]
    fn test_no_token_no_header() {
        let interceptor = AuthInterceptor::new(Arc::new(MemoryCredentialStore::new()));

        let request = interceptor.apply(RequestDescriptor::get("/recipe")).unwrap();
        assert!(request.headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_encodes_structured_body() {
        let interceptor = AuthInterceptor::new(Arc::new(MemoryCredentialStore::new()));
        let request = RequestDescriptor::new(Method::POST, "/auth/login")
            .with_body(Body::Structured(json!({"email": "cook@example.com"})));

        let request = interceptor.apply(request).unwrap();
        assert!(matches!(request.body, Body::Form(ref form) if form == "email=cook%40example.com"));
    }

    #[test]
    fn test_unrepresentable_token_is_an_error() {
        let interceptor =
            AuthInterceptor::new(Arc::new(MemoryCredentialStore::with_token("bad\ntoken")));

        let err = interceptor.apply(RequestDescriptor::get("/recipe")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidHeader(_)));
    }
}
