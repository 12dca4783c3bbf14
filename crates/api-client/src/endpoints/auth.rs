//! Authentication endpoints
//!
//! Login and register responses carry `{token, role}` under `data`; the
//! pipeline persists the token on its own when the role is privileged.

use crate::client::CookbookClient;
use crate::error::ApiResult;
use crate::middleware::session::REFRESH_PATH;
use crate::request::{ApiResponse, Body};
use serde::Serialize;

/// Base path of the authentication resource
pub const AUTHENTICATION_PATH: &str = "/auth";

/// Authentication API interface
#[derive(Clone)]
pub struct AuthApi {
    client: CookbookClient,
}

impl AuthApi {
    /// Create a new authentication API interface
    pub(crate) fn new(client: CookbookClient) -> Self {
        Self { client }
    }

    /// Create an account
    ///
    /// POST /auth/register
    pub async fn register<B: Serialize + ?Sized>(&self, user: &B) -> ApiResult<ApiResponse> {
        self.client
            .post(&format!("{AUTHENTICATION_PATH}/register"), Body::json(user)?)
            .await
    }

    /// Sign in
    ///
    /// POST /auth/login
    pub async fn login<B: Serialize + ?Sized>(&self, credentials: &B) -> ApiResult<ApiResponse> {
        self.client
            .post(&format!("{AUTHENTICATION_PATH}/login"), Body::json(credentials)?)
            .await
    }

    /// Exchange the refresh cookie for a new access token
    ///
    /// GET /auth/refresh-token
    pub async fn refresh_token(&self) -> ApiResult<ApiResponse> {
        self.client.get(REFRESH_PATH).await
    }

    /// Sign out on the backend
    ///
    /// GET /auth/logout. Local credentials are left alone.
    pub async fn logout(&self) -> ApiResult<ApiResponse> {
        self.client
            .get(&format!("{AUTHENTICATION_PATH}/logout"))
            .await
    }
}

/// Login form
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl LoginRequest {
    /// Create a login form
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}
