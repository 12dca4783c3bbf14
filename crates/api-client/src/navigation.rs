//! Navigation hook invoked when a session cannot be recovered

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::warn;

/// Authentication entry point the application is sent to on hard logout
pub const AUTH_ENTRY_PATH: &str = "/auth";

/// Application navigation
pub trait Navigator: Send + Sync {
    /// Navigate to `path`, replacing the current history entry
    fn replace(&self, path: &str);
}

/// Navigator for headless consumers: only logs the redirect
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn replace(&self, path: &str) {
        warn!(target_path = %path, "Session ended, sign in again to continue");
    }
}

/// Navigator that remembers where the application was sent
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    current: RwLock<Option<String>>,
    replacements: AtomicUsize,
}

impl RecordingNavigator {
    /// Create a navigator with no location yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Last path navigated to
    pub fn current(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `replace` calls so far
    pub fn replacements(&self) -> usize {
        self.replacements.load(Ordering::Relaxed)
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(path.to_string());
        self.replacements.fetch_add(1, Ordering::Relaxed);
    }
}
