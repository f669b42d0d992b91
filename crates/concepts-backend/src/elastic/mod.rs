//! HTTP client for the search cluster.
//!
//! Speaks the three endpoints the service needs: `/{index}/_search`,
//! `/_msearch` (NDJSON) and `/_cluster/health`.

mod client;
mod error;

pub use client::ElasticClient;
pub use error::{parse_error_reason, to_search_error, ElasticErrorCode};
