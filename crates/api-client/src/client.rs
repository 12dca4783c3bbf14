//! Main API client implementation

use crate::codec;
use crate::config::ClientConfig;
use crate::endpoints::{
    AuthApi, BookmarksApi, CategoriesApi, LikersApi, ProfilesApi, RecipesApi, VideosApi,
};
use crate::error::{ApiResult, ErrorContext};
use crate::middleware::refresh::{AuthSession, RefreshAction, RefreshCoordinator, SharedAuthState};
use crate::middleware::session::{SessionRecovery, SessionStats};
use crate::middleware::AuthInterceptor;
use crate::navigation::{LogNavigator, Navigator};
use crate::request::{ApiResponse, Body, RequestDescriptor, RetryContext};
use crate::store::{CredentialStore, DurableCredentialStore};
use crate::transport::{HttpTransport, Transport};
use reqwest::header::HeaderValue;
use reqwest::Method;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tracing::{debug, field, instrument, Span};
use uuid::Uuid;

/// Request correlation ID header
pub const X_REQUEST_ID: &str = "X-Request-ID";

type RefreshFactory = Box<dyn FnOnce(WeakClient) -> Arc<dyn RefreshAction> + Send>;

/// Cookbook API client
///
/// Every call runs through the same pipeline:
/// - body encoding and bearer token injection
/// - one transport attempt
/// - session recovery (token persistence, refresh-and-replay, hard logout)
///
/// Cloning is cheap; clones share credentials, refresh state and counters.
#[derive(Clone)]
pub struct CookbookClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    interceptor: AuthInterceptor,
    recovery: SessionRecovery,
    auth_state: SharedAuthState,
}

/// Non-owning handle to a [`CookbookClient`]
///
/// Held by refresh actions that call back into the client.
#[derive(Clone)]
pub struct WeakClient {
    inner: Weak<ClientInner>,
}

impl WeakClient {
    /// Get the client back if it is still alive
    pub fn upgrade(&self) -> Option<CookbookClient> {
        self.inner.upgrade().map(|inner| CookbookClient { inner })
    }
}

impl CookbookClient {
    /// Create a new client with default configuration from environment
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        Self::builder(config).build()
    }

    /// Start building a client with injected collaborators
    pub fn builder(config: ClientConfig) -> CookbookClientBuilder {
        CookbookClientBuilder::new(config)
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.config.base_url
    }

    /// Credential store used by the pipeline
    #[must_use]
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.inner.store.as_ref()
    }

    /// Session recovery counters
    #[must_use]
    pub fn session_stats(&self) -> &SessionStats {
        self.inner.recovery.stats()
    }

    /// Number of refresh dispatches so far
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.inner.recovery.coordinator().dispatch_count()
    }

    /// State written by the built-in refresh action
    #[must_use]
    pub fn auth_state(&self) -> SharedAuthState {
        Arc::clone(&self.inner.auth_state)
    }

    /// Weak handle for collaborators that call back into the client
    #[must_use]
    pub fn downgrade(&self) -> WeakClient {
        WeakClient {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access authentication endpoints
    #[must_use]
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access recipe endpoints
    #[must_use]
    pub fn recipes(&self) -> RecipesApi {
        RecipesApi::new(self.clone())
    }

    /// Access category endpoints
    #[must_use]
    pub fn categories(&self) -> CategoriesApi {
        CategoriesApi::new(self.clone())
    }

    /// Access video endpoints
    #[must_use]
    pub fn videos(&self) -> VideosApi {
        VideosApi::new(self.clone())
    }

    /// Access profile endpoints
    #[must_use]
    pub fn profiles(&self) -> ProfilesApi {
        ProfilesApi::new(self.clone())
    }

    /// Access liker endpoints
    #[must_use]
    pub fn likers(&self) -> LikersApi {
        LikersApi::new(self.clone())
    }

    /// Access bookmark endpoints
    #[must_use]
    pub fn bookmarks(&self) -> BookmarksApi {
        BookmarksApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Low-level HTTP methods
    // -------------------------------------------------------------------------

    /// Perform a GET request
    pub async fn get(&self, path: &str) -> ApiResult<ApiResponse> {
        self.execute(RequestDescriptor::get(path)).await
    }

    /// Perform a GET request with a filter serialized into the query string
    ///
    /// An empty filter sends no query string at all.
    pub async fn get_filtered<F: Serialize + ?Sized>(
        &self,
        path: &str,
        filter: &F,
    ) -> ApiResult<ApiResponse> {
        let query = codec::query_from(filter)?;
        self.execute(RequestDescriptor::get(path).with_query(query))
            .await
    }

    /// Perform a POST request
    pub async fn post(&self, path: &str, body: Body) -> ApiResult<ApiResponse> {
        self.execute(RequestDescriptor::new(Method::POST, path).with_body(body))
            .await
    }

    /// Perform a PUT request
    pub async fn put(&self, path: &str, body: Body) -> ApiResult<ApiResponse> {
        self.execute(RequestDescriptor::new(Method::PUT, path).with_body(body))
            .await
    }

    /// Perform a DELETE request
    pub async fn delete(&self, path: &str) -> ApiResult<ApiResponse> {
        self.execute(RequestDescriptor::new(Method::DELETE, path))
            .await
    }

    /// Run one logical call through the full pipeline
    pub async fn execute(&self, request: RequestDescriptor) -> ApiResult<ApiResponse> {
        self.execute_with(request, RetryContext::fresh()).await
    }

    /// Run one logical call with explicit retry bookkeeping
    ///
    /// A call started with [`RetryContext::retried`] never triggers a refresh.
    #[instrument(
        skip_all,
        fields(method = %request.method, path = %request.path, request_id = field::Empty)
    )]
    pub async fn execute_with(
        &self,
        mut request: RequestDescriptor,
        ctx: RetryContext,
    ) -> ApiResult<ApiResponse> {
        let request_id = match request.headers.get(X_REQUEST_ID) {
            Some(existing) => existing.to_str().unwrap_or_default().to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                if let Ok(value) = HeaderValue::from_str(&id) {
                    request.headers.insert(X_REQUEST_ID, value);
                }
                id
            }
        };
        Span::current().record("request_id", request_id.as_str());

        let request = self.inner.interceptor.apply(request)?;
        let outcome = self.inner.transport.send(&request).await;

        let result = self
            .inner
            .recovery
            .resolve(self.inner.transport.as_ref(), &request, ctx, outcome)
            .await;

        if let Err(ref e) = result {
            let context = ErrorContext {
                request_id: Some(request_id),
                endpoint: request.path_and_query(),
                method: request.method.to_string(),
            };
            debug!(%context, error = %e, "Request failed");
        }

        result
    }
}

/// Builder for [`CookbookClient`]
///
/// Every collaborator has a default:
/// - transport: [`HttpTransport`] built from the configuration
/// - credential store: [`DurableCredentialStore`] at the configured path
/// - navigator: [`LogNavigator`]
/// - refresh action: [`AuthSession`] calling the refresh endpoint
pub struct CookbookClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn CredentialStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    refresh: Option<RefreshFactory>,
    auth_state: Option<SharedAuthState>,
}

impl CookbookClientBuilder {
    /// Start from a configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            store: None,
            navigator: None,
            refresh: None,
            auth_state: None,
        }
    }

    /// Use a custom transport
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom credential store
    #[must_use]
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom navigator
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Use a custom refresh action
    #[must_use]
    pub fn refresh_action(mut self, action: Arc<dyn RefreshAction>) -> Self {
        self.refresh = Some(Box::new(move |_: WeakClient| action));
        self
    }

    /// Build the refresh action from a weak handle to the client being built
    #[must_use]
    pub fn refresh_action_with<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(WeakClient) -> Arc<dyn RefreshAction> + Send + 'static,
    {
        self.refresh = Some(Box::new(factory));
        self
    }

    /// Share an existing auth state with the built-in refresh action
    #[must_use]
    pub fn auth_state(mut self, state: SharedAuthState) -> Self {
        self.auth_state = Some(state);
        self
    }

    /// Validate the configuration and assemble the pipeline
    pub fn build(self) -> ApiResult<CookbookClient> {
        let Self {
            config,
            transport,
            store,
            navigator,
            refresh,
            auth_state,
        } = self;

        config.validate()?;

        let transport: Arc<dyn Transport> = match transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&config)?),
        };
        let store: Arc<dyn CredentialStore> = match store {
            Some(store) => store,
            None => Arc::new(DurableCredentialStore::new(config.storage_config())?),
        };
        let navigator = navigator.unwrap_or_else(|| Arc::new(LogNavigator));
        let auth_state = auth_state.unwrap_or_default();

        let inner = Arc::new_cyclic(|weak: &Weak<ClientInner>| {
            let handle = WeakClient {
                inner: weak.clone(),
            };
            let action: Arc<dyn RefreshAction> = match refresh {
                Some(factory) => factory(handle),
                None => Arc::new(AuthSession::new(handle, Arc::clone(&auth_state))),
            };
            let coordinator = Arc::new(RefreshCoordinator::new(action, config.refresh_policy));

            ClientInner {
                interceptor: AuthInterceptor::new(Arc::clone(&store)),
                recovery: SessionRecovery::new(Arc::clone(&store), coordinator, navigator),
                config,
                transport,
                store,
                auth_state,
            }
        });

        debug!(
            base_url = %inner.config.base_url,
            refresh_policy = ?inner.config.refresh_policy,
            "Cookbook client ready"
        );

        Ok(CookbookClient { inner })
    }
}
