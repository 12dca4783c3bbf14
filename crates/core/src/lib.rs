//! Core utilities for the Cookbook client
//!
//! This crate provides shared functionality used by the API client and the CLI:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Durable storage**: A synchronous key-value store that survives restarts
//! - **Durations**: Parsing of human-readable duration strings such as `1m30s`
//!
//! # Example
//!
//! ```rust,no_run
//! use cookbook_core::{duration::parse_duration, storage::KeyValueStore};
//!
//! let timeout = parse_duration("30s").expect("valid duration");
//! assert_eq!(timeout.as_millis(), 30_000);
//!
//! let store = KeyValueStore::default_store().expect("storage available");
//! let token = store.get("@acc_token").expect("readable storage");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod duration;
pub mod error;
pub mod storage;

pub use error::{Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::duration::{format_duration, parse_duration};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result};
    pub use crate::storage::{KeyValueStore, StorageConfig};
}
