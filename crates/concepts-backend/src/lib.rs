//! # concepts-backend
//!
//! Search cluster access for the concept search API.
//!
//! This crate provides:
//! - The [`SearchBackend`] capability (search, multi-search, cluster health)
//! - An HTTP implementation over the cluster's REST API
//! - A late-bound [`BackendHandle`] filled by a background connector
//! - The [`Dispatcher`] that picks the index alias and scoring mode
//!
//! # Feature Flags
//!
//! - `mock`: Enable [`mock::MockSearchBackend`] for tests in dependent crates
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use concepts_backend::{spawn_backend_connector, BackendConfig, BackendHandle};
//! use concepts_backend::{Dispatcher, IndexNames};
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = BackendHandle::empty();
//!     spawn_backend_connector(handle.clone(), BackendConfig::default(), Duration::from_secs(60));
//!     let dispatcher = Dispatcher::new(handle, IndexNames::default());
//! }
//! ```

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod elastic;
pub mod handle;

// Mock search backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use backend::{ClusterHealth, Hit, SearchBackend, SearchRequest, SearchResponse, SearchType};
pub use config::{AuthMode, BackendAuth, BackendConfig, ConfigError};
pub use dispatcher::{Dispatch, Dispatcher, IndexNames, IndexScope};
pub use elastic::ElasticClient;
pub use handle::{connect_elastic, connect_with_retry, spawn_backend_connector, BackendHandle};
