//! Credential refresh coordination
//!
//! The coordinator asks an external [`RefreshAction`] to renew the session and
//! then reads the fresh access token out of that action's state. It knows
//! nothing about the request that triggered it.
//!
//! Concurrent failures are coalesced by default ([`RefreshPolicy::SingleFlight`]):
//! callers that arrive while a refresh is running wait for it and share its
//! outcome. [`RefreshPolicy::Independent`] runs one refresh per failing request.

use crate::client::WeakClient;
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Refresh failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    /// The external refresh operation failed
    #[error("{0}")]
    Failed(String),

    /// The refresh completed but left no access token behind
    #[error("refresh completed without an access token")]
    MissingToken,

    /// The refresh itself ended the session
    #[error("session ended during refresh")]
    SessionEnded,
}

/// How concurrent refreshes are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Coalesce refreshes that overlap into one dispatch
    #[default]
    SingleFlight,
    /// Every failing request runs its own refresh
    Independent,
}

impl FromStr for RefreshPolicy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single-flight" | "single_flight" | "singleflight" => Ok(Self::SingleFlight),
            "independent" => Ok(Self::Independent),
            other => Err(ApiError::config(format!(
                "unknown refresh policy `{other}` (expected single-flight or independent)"
            ))),
        }
    }
}

/// External credential refresh operation
///
/// `dispatch` performs the refresh round-trip; afterwards `access_token`
/// exposes the token it obtained.
///
/// A dispatch must not issue requests that can themselves trigger a refresh
/// (any path other than the refresh endpoint): under single-flight that would
/// wait on its own flight.
#[async_trait]
pub trait RefreshAction: Send + Sync {
    /// Perform the refresh round-trip
    async fn dispatch(&self) -> Result<(), RefreshError>;

    /// Access token left behind by the last dispatch
    fn access_token(&self) -> Option<String>;

    /// Drop any session data held by the action (hard logout)
    fn clear(&self) {}
}

/// Session state shared between the built-in refresh action and the application
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    /// Body of the last successful refresh response
    pub refresh_response: Option<Value>,
    /// Access token from the last successful refresh
    pub access_token: Option<String>,
    /// Message of the last failed refresh
    pub last_error: Option<String>,
}

/// Handle to [`AuthState`]
pub type SharedAuthState = Arc<RwLock<AuthState>>;

/// Built-in refresh action: `GET /auth/refresh-token` through the client pipeline
///
/// Going through the pipeline means a rejected refresh token hits the
/// hard-logout path like any other call to that endpoint.
pub struct AuthSession {
    client: WeakClient,
    state: SharedAuthState,
}

impl AuthSession {
    /// Create the action for a client, recording results in `state`
    pub fn new(client: WeakClient, state: SharedAuthState) -> Self {
        Self { client, state }
    }

    /// Shared state handle
    pub fn state(&self) -> SharedAuthState {
        Arc::clone(&self.state)
    }
}

#[async_trait]
impl RefreshAction for AuthSession {
    async fn dispatch(&self) -> Result<(), RefreshError> {
        let client = self
            .client
            .upgrade()
            .ok_or_else(|| RefreshError::Failed("client has been dropped".to_string()))?;

        let result = client.auth().refresh_token().await;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        match result {
            Ok(response) => {
                state.access_token = response
                    .data()
                    .and_then(|data| data.get("token"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                state.refresh_response = Some(response.body);
                state.last_error = None;
                Ok(())
            }
            Err(ApiError::SessionEnded) => {
                *state = AuthState::default();
                Err(RefreshError::SessionEnded)
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                Err(RefreshError::Failed(e.to_string()))
            }
        }
    }

    fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access_token
            .clone()
    }

    fn clear(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = AuthState::default();
    }
}

#[derive(Default)]
struct Flight {
    generation: u64,
    last: Option<Result<String, RefreshError>>,
}

/// Runs refreshes on behalf of failing requests
pub struct RefreshCoordinator {
    action: Arc<dyn RefreshAction>,
    policy: RefreshPolicy,
    flight: Mutex<Flight>,
    completed: AtomicU64,
    dispatches: AtomicU64,
}

impl RefreshCoordinator {
    /// Create a coordinator around an action
    pub fn new(action: Arc<dyn RefreshAction>, policy: RefreshPolicy) -> Self {
        Self {
            action,
            policy,
            flight: Mutex::new(Flight::default()),
            completed: AtomicU64::new(0),
            dispatches: AtomicU64::new(0),
        }
    }

    /// Obtain a fresh access token
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        match self.policy {
            RefreshPolicy::Independent => self.run().await,
            RefreshPolicy::SingleFlight => self.coalesced().await,
        }
    }

    /// Drop session data held by the action
    pub fn clear(&self) {
        self.action.clear();
    }

    /// Number of times the action has been dispatched
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches.load(Ordering::Relaxed)
    }

    /// Configured policy
    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    async fn coalesced(&self) -> Result<String, RefreshError> {
        let seen = self.completed.load(Ordering::Acquire);
        let mut flight = self.flight.lock().await;

        // A flight finished while we were queued: its outcome is ours
        if flight.generation != seen {
            if let Some(ref outcome) = flight.last {
                debug!(generation = flight.generation, "Joined completed refresh");
                return outcome.clone();
            }
        }

        let outcome = self.run().await;
        flight.generation += 1;
        flight.last = Some(outcome.clone());
        self.completed.store(flight.generation, Ordering::Release);
        outcome
    }

    async fn run(&self) -> Result<String, RefreshError> {
        let attempt = self.dispatches.fetch_add(1, Ordering::Relaxed) + 1;
        info!(attempt, "Refreshing credentials");

        if let Err(e) = self.action.dispatch().await {
            warn!(attempt, error = %e, "Credential refresh failed");
            return Err(e);
        }

        self.action
            .access_token()
            .filter(|token| !token.is_empty())
            .ok_or(RefreshError::MissingToken)
    }
}

/// Refresh through a closure, for embedders that already own a refresh routine
pub struct FnRefreshAction<F> {
    refresh: F,
    token: RwLock<Option<String>>,
}

impl<F, Fut> FnRefreshAction<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = ApiResult<String>> + Send,
{
    /// Wrap a closure returning the new access token
    pub fn new(refresh: F) -> Self {
        Self {
            refresh,
            token: RwLock::new(None),
        }
    }
}

#[async_trait]
impl<F, Fut> RefreshAction for FnRefreshAction<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = ApiResult<String>> + Send,
{
    async fn dispatch(&self) -> Result<(), RefreshError> {
        let token = (self.refresh)().await.map_err(|e| match e {
            ApiError::SessionEnded => RefreshError::SessionEnded,
            other => RefreshError::Failed(other.to_string()),
        })?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        Ok(())
    }

    fn access_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
