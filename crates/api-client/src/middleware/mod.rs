//! Request/response processing around the transport
//!
//! - [`auth`]: request interceptor that encodes bodies and attaches the bearer token
//! - [`session`]: response classification and session recovery
//! - [`refresh`]: credential refresh coordination

pub mod auth;
pub mod refresh;
pub mod session;

pub use auth::AuthInterceptor;
pub use refresh::{
    AuthSession, AuthState, FnRefreshAction, RefreshAction, RefreshCoordinator, RefreshError, RefreshPolicy,
    SharedAuthState,
};
pub use session::{
    classify, Disposition, SessionRecovery, SessionSnapshot, SessionSignal, SessionStats,
};
