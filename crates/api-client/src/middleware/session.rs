//! Response classification and session recovery
//!
//! Every completed transport attempt is classified once, in strict priority
//! order:
//!
//! 1. success: persist a privileged token if the body carries one, pass through
//! 2. 412 with a dead-session signal on the refresh endpoint: hard logout
//! 3. 401 with a missing/invalid access token signal elsewhere, not yet
//!    replayed: refresh credentials and replay once
//! 4. anything else: propagate unchanged

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::bearer;
use crate::middleware::refresh::RefreshCoordinator;
use crate::navigation::{Navigator, AUTH_ENTRY_PATH};
use crate::request::{ApiResponse, RequestDescriptor, RetryContext};
use crate::store::CredentialStore;
use crate::transport::Transport;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Path fragment identifying the refresh endpoint
pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// Role whose tokens are persisted from success responses
pub const PRIVILEGED_ROLE: &str = "ADMIN";

/// Session-related condition reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSignal {
    /// `jwt expired`
    JwtExpired,
    /// `Session unavailable`
    SessionUnavailable,
    /// `Refresh token must be conditioned`
    RefreshTokenMalformed,
    /// `Empty access token`
    EmptyAccessToken,
    /// `Bearer token must be conditioned`
    BearerTokenMalformed,
}

impl SessionSignal {
    /// Parse a machine-readable error code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "JWT_EXPIRED" => Some(Self::JwtExpired),
            "SESSION_UNAVAILABLE" => Some(Self::SessionUnavailable),
            "REFRESH_TOKEN_MALFORMED" => Some(Self::RefreshTokenMalformed),
            "EMPTY_ACCESS_TOKEN" => Some(Self::EmptyAccessToken),
            "BEARER_TOKEN_MALFORMED" => Some(Self::BearerTokenMalformed),
            _ => None,
        }
    }

    /// Match the exact message text sent by the backend
    pub fn from_message(message: &str) -> Option<Self> {
        match message {
            "jwt expired" => Some(Self::JwtExpired),
            "Session unavailable" => Some(Self::SessionUnavailable),
            "Refresh token must be conditioned" => Some(Self::RefreshTokenMalformed),
            "Empty access token" => Some(Self::EmptyAccessToken),
            "Bearer token must be conditioned" => Some(Self::BearerTokenMalformed),
            _ => None,
        }
    }

    /// Extract the signal from a response body, preferring `data.code` over `data.message`
    pub fn from_body(body: &Value) -> Option<Self> {
        let data = body.get("data")?;

        if let Some(signal) = data
            .get("code")
            .and_then(Value::as_str)
            .and_then(Self::from_code)
        {
            return Some(signal);
        }

        data.get("message")
            .and_then(Value::as_str)
            .and_then(Self::from_message)
    }

    /// The refresh credential itself is dead
    #[must_use]
    pub fn ends_session(self) -> bool {
        matches!(
            self,
            Self::JwtExpired | Self::SessionUnavailable | Self::RefreshTokenMalformed
        )
    }

    /// The access token is missing or unusable, a refresh may help
    #[must_use]
    pub fn is_recoverable(self) -> bool {
        matches!(
            self,
            Self::SessionUnavailable | Self::EmptyAccessToken | Self::BearerTokenMalformed
        )
    }
}

/// What the pipeline does with a completed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Successful response, returned as-is
    Passthrough,
    /// Wipe credentials and send the user to the auth entry point
    HardLogout,
    /// Refresh credentials and replay the request once
    AttemptRefresh,
    /// Return the failure unchanged
    Propagate,
}

/// Classify one completed attempt
pub fn classify(outcome: &ApiResult<ApiResponse>, path: &str, ctx: RetryContext) -> Disposition {
    let response = match outcome {
        Ok(response) => response,
        Err(_) => return Disposition::Propagate,
    };

    if response.is_success() {
        return Disposition::Passthrough;
    }

    let Some(signal) = SessionSignal::from_body(&response.body) else {
        return Disposition::Propagate;
    };
    let on_refresh_path = path.contains(REFRESH_PATH);

    if response.status == StatusCode::PRECONDITION_FAILED && signal.ends_session() && on_refresh_path
    {
        return Disposition::HardLogout;
    }

    if response.status == StatusCode::UNAUTHORIZED
        && signal.is_recoverable()
        && !on_refresh_path
        && !ctx.is_retried()
    {
        return Disposition::AttemptRefresh;
    }

    Disposition::Propagate
}

/// Token carried by a success body for the privileged role
pub fn privileged_token(body: &Value) -> Option<&str> {
    let data = body.get("data")?;

    if data.get("role").and_then(Value::as_str) != Some(PRIVILEGED_ROLE) {
        return None;
    }

    data.get("token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
}

/// Recovery counters
#[derive(Debug, Default)]
pub struct SessionStats {
    refresh_attempts: AtomicU64,
    replays: AtomicU64,
    hard_logouts: AtomicU64,
}

/// Point-in-time copy of [`SessionStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Recoverable failures that ran the refresh coordinator
    pub refresh_attempts: u64,
    /// Requests resubmitted after a refresh
    pub replays: u64,
    /// Sessions ended by a rejected refresh credential
    pub hard_logouts: u64,
}

impl SessionStats {
    /// Current counter values
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            refresh_attempts: self.refresh_attempts.load(Ordering::Relaxed),
            replays: self.replays.load(Ordering::Relaxed),
            hard_logouts: self.hard_logouts.load(Ordering::Relaxed),
        }
    }
}

/// Acts on the classification of each attempt
pub struct SessionRecovery {
    store: Arc<dyn CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
    navigator: Arc<dyn Navigator>,
    stats: SessionStats,
}

impl SessionRecovery {
    /// Create the recovery stage
    pub fn new(
        store: Arc<dyn CredentialStore>,
        coordinator: Arc<RefreshCoordinator>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            coordinator,
            navigator,
            stats: SessionStats::default(),
        }
    }

    /// Recovery counters
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Refresh coordinator used for recoverable failures
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Turn a completed attempt into the final outcome of the call
    ///
    /// `request` must be the descriptor exactly as it was sent, so a replay
    /// only differs from it in the `Authorization` header.
    pub async fn resolve(
        &self,
        transport: &dyn Transport,
        request: &RequestDescriptor,
        ctx: RetryContext,
        outcome: ApiResult<ApiResponse>,
    ) -> ApiResult<ApiResponse> {
        match classify(&outcome, &request.path, ctx) {
            Disposition::Passthrough => {
                let response = outcome?;
                if let Some(token) = privileged_token(&response.body) {
                    debug!(path = %request.path, "Persisting access token");
                    self.store.set(token);
                }
                Ok(response)
            }
            Disposition::HardLogout => {
                self.stats.hard_logouts.fetch_add(1, Ordering::Relaxed);
                warn!(path = %request.path, "Refresh credential rejected, ending session");

                self.store.clear();
                self.coordinator.clear();
                self.navigator.replace(AUTH_ENTRY_PATH);
                Err(ApiError::SessionEnded)
            }
            Disposition::AttemptRefresh => {
                self.stats.refresh_attempts.fetch_add(1, Ordering::Relaxed);
                let token = self.coordinator.refresh().await?;

                let mut replay = request.clone();
                replay.headers.insert(AUTHORIZATION, bearer(&token)?);

                self.stats.replays.fetch_add(1, Ordering::Relaxed);
                info!(method = %replay.method, path = %replay.path, "Replaying request with refreshed credentials");

                // Sent straight to the transport and never classified, so a
                // logical call refreshes at most once
                transport.send(&replay).await.and_then(settle)
            }
            Disposition::Propagate => outcome.and_then(settle),
        }
    }
}

fn settle(response: ApiResponse) -> ApiResult<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(response.into_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::refresh::{RefreshAction, RefreshError, RefreshPolicy};
    use crate::navigation::RecordingNavigator;
    use crate::store::MemoryCredentialStore;
    use async_trait::async_trait;
    use reqwest::header::HeaderMap;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn response(status: u16, body: Value) -> ApiResponse {
        ApiResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body,
        }
    }

    fn failure(status: u16, message: &str) -> ApiResult<ApiResponse> {
        Ok(response(status, json!({"data": {"message": message}})))
    }

    #[test]
    fn test_signal_prefers_code() {
        let body = json!({"data": {"code": "EMPTY_ACCESS_TOKEN", "message": "jwt expired"}});
        assert_eq!(
            SessionSignal::from_body(&body),
            Some(SessionSignal::EmptyAccessToken)
        );

        let body = json!({"data": {"code": "SOMETHING_ELSE", "message": "jwt expired"}});
        assert_eq!(SessionSignal::from_body(&body), Some(SessionSignal::JwtExpired));
    }

    #[test]
    fn test_signal_requires_exact_text() {
        assert_eq!(SessionSignal::from_message("JWT expired"), None);
        assert_eq!(SessionSignal::from_message("jwt expired "), None);
        assert_eq!(SessionSignal::from_body(&json!({"message": "jwt expired"})), None);
        assert_eq!(SessionSignal::from_body(&json!("jwt expired")), None);
        assert_eq!(SessionSignal::from_body(&Value::Null), None);
    }

    #[test]
    fn test_classify_success() {
        let outcome = Ok(response(200, json!({"data": []})));
        assert_eq!(
            classify(&outcome, "/recipe", RetryContext::fresh()),
            Disposition::Passthrough
        );
    }

    #[test]
    fn test_classify_hard_logout() {
        for message in ["jwt expired", "Session unavailable", "Refresh token must be conditioned"] {
            assert_eq!(
                classify(&failure(412, message), REFRESH_PATH, RetryContext::fresh()),
                Disposition::HardLogout,
                "{message}"
            );
        }

        // Only on the refresh endpoint
        assert_eq!(
            classify(&failure(412, "jwt expired"), "/recipe", RetryContext::fresh()),
            Disposition::Propagate
        );
        // 412 with a recoverable-only signal
        assert_eq!(
            classify(&failure(412, "Empty access token"), REFRESH_PATH, RetryContext::fresh()),
            Disposition::Propagate
        );
    }

    #[test]
    fn test_classify_attempt_refresh() {
        for message in ["Session unavailable", "Empty access token", "Bearer token must be conditioned"] {
            assert_eq!(
                classify(&failure(401, message), "/recipe/1", RetryContext::fresh()),
                Disposition::AttemptRefresh,
                "{message}"
            );
        }

        assert_eq!(
            classify(&failure(401, "jwt expired"), "/recipe", RetryContext::fresh()),
            Disposition::Propagate
        );
        assert_eq!(
            classify(&failure(401, "Empty access token"), "/recipe", RetryContext::retried()),
            Disposition::Propagate
        );
        assert_eq!(
            classify(&failure(401, "Empty access token"), REFRESH_PATH, RetryContext::fresh()),
            Disposition::Propagate
        );
    }

    #[test]
    fn test_classify_without_message() {
        let outcome = Ok(response(401, json!({"data": {}})));
        assert_eq!(
            classify(&outcome, "/recipe", RetryContext::fresh()),
            Disposition::Propagate
        );

        let outcome = Ok(response(500, Value::String("<html>".to_string())));
        assert_eq!(
            classify(&outcome, "/recipe", RetryContext::fresh()),
            Disposition::Propagate
        );

        let outcome = Err(ApiError::Timeout(std::time::Duration::from_secs(1)));
        assert_eq!(
            classify(&outcome, "/recipe", RetryContext::fresh()),
            Disposition::Propagate
        );
    }

    #[test]
    fn test_privileged_token() {
        let body = json!({"data": {"token": "T", "role": "ADMIN"}});
        assert_eq!(privileged_token(&body), Some("T"));

        assert_eq!(privileged_token(&json!({"data": {"token": "T", "role": "USER"}})), None);
        assert_eq!(privileged_token(&json!({"data": {"role": "ADMIN"}})), None);
        assert_eq!(privileged_token(&json!({"data": {"token": 5, "role": "ADMIN"}})), None);
        assert_eq!(privileged_token(&json!({"data": {"token": "", "role": "ADMIN"}})), None);
    }

    /// Transport that plays back canned responses and records what it was sent
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        sent: Mutex<Vec<RequestDescriptor>>,
    }

    impl ScriptedTransport {
        fn with(responses: Vec<ApiResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                sent: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &RequestDescriptor) -> ApiResult<ApiResponse> {
            self.sent.lock().unwrap().push(request.clone());
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted"))
        }
    }

    struct StaticAction(Result<Option<String>, RefreshError>);

    #[async_trait]
    impl RefreshAction for StaticAction {
        async fn dispatch(&self) -> Result<(), RefreshError> {
            self.0.clone().map(|_| ())
        }

        fn access_token(&self) -> Option<String> {
            self.0.clone().ok().flatten()
        }
    }

    fn recovery(
        store: Arc<MemoryCredentialStore>,
        navigator: Arc<RecordingNavigator>,
        action: StaticAction,
    ) -> SessionRecovery {
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::new(action),
            RefreshPolicy::SingleFlight,
        ));
        SessionRecovery::new(store, coordinator, navigator)
    }

    #[tokio::test]
    async fn test_resolve_persists_admin_token() {
        let store = Arc::new(MemoryCredentialStore::new());
        let recovery = recovery(
            store.clone(),
            Arc::new(RecordingNavigator::new()),
            StaticAction(Ok(None)),
        );
        let transport = ScriptedTransport::default();

        let outcome = Ok(response(200, json!({"data": {"token": "T", "role": "ADMIN"}})));
        let request = RequestDescriptor::new(reqwest::Method::POST, "/auth/login");
        let result = recovery
            .resolve(&transport, &request, RetryContext::fresh(), outcome)
            .await;

        assert!(result.is_ok());
        assert_eq!(store.get().as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn test_resolve_refresh_and_replay() {
        let store = Arc::new(MemoryCredentialStore::with_token("stale"));
        let recovery = recovery(
            store.clone(),
            Arc::new(RecordingNavigator::new()),
            StaticAction(Ok(Some("fresh".to_string()))),
        );
        let transport = ScriptedTransport::with(vec![response(200, json!({"data": []}))]);

        let request = RequestDescriptor::get("/recipe");
        let result = recovery
            .resolve(
                &transport,
                &request,
                RetryContext::fresh(),
                failure(401, "Empty access token"),
            )
            .await;

        assert!(result.is_ok());
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].headers.get(AUTHORIZATION).unwrap(), "Bearer fresh");
        assert_eq!(sent[0].path, "/recipe");

        let stats = recovery.stats().snapshot();
        assert_eq!(stats.refresh_attempts, 1);
        assert_eq!(stats.replays, 1);
    }

    #[tokio::test]
    async fn test_replay_failure_is_final() {
        let recovery = recovery(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingNavigator::new()),
            StaticAction(Ok(Some("fresh".to_string()))),
        );
        let transport = ScriptedTransport::with(vec![response(
            401,
            json!({"data": {"message": "Empty access token"}}),
        )]);

        let err = recovery
            .resolve(
                &transport,
                &RequestDescriptor::get("/recipe"),
                RetryContext::fresh(),
                failure(401, "Empty access token"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
        // The replay's own 401 is not fed back into recovery
        assert_eq!(recovery.stats().snapshot().refresh_attempts, 1);
        assert_eq!(recovery.coordinator().dispatch_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_is_final() {
        let recovery = recovery(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingNavigator::new()),
            StaticAction(Err(RefreshError::Failed("offline".to_string()))),
        );
        let transport = ScriptedTransport::default();

        let err = recovery
            .resolve(
                &transport,
                &RequestDescriptor::get("/recipe"),
                RetryContext::fresh(),
                failure(401, "Session unavailable"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Refresh(RefreshError::Failed(_))));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_hard_logout() {
        let store = Arc::new(MemoryCredentialStore::with_token("T"));
        let navigator = Arc::new(RecordingNavigator::new());
        let recovery = recovery(store.clone(), navigator.clone(), StaticAction(Ok(None)));
        let transport = ScriptedTransport::default();

        let err = recovery
            .resolve(
                &transport,
                &RequestDescriptor::get(REFRESH_PATH),
                RetryContext::fresh(),
                failure(412, "jwt expired"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::SessionEnded));
        assert_eq!(store.get(), None);
        assert_eq!(navigator.current().as_deref(), Some(AUTH_ENTRY_PATH));
        assert_eq!(recovery.stats().snapshot().hard_logouts, 1);
    }

    #[tokio::test]
    async fn test_propagate_converts_failure() {
        let recovery = recovery(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingNavigator::new()),
            StaticAction(Ok(None)),
        );
        let transport = ScriptedTransport::default();

        let err = recovery
            .resolve(
                &transport,
                &RequestDescriptor::get("/recipe/9"),
                RetryContext::fresh(),
                Ok(response(404, json!({"data": {"message": "Recipe not found"}}))),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::ApiResponse { status: 404, ref message, .. } if message == "Recipe not found"
        ));
    }
}
