//! Centralized default constants for the concept search API.
//!
//! Startup flags fall back to these values; handlers and the query builder
//! reference them instead of defining their own magic numbers.

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const HOST: &str = "0.0.0.0";

/// Default bind port.
pub const PORT: u16 = 8080;

/// System code reported by the health endpoints.
pub const SYSTEM_CODE: &str = "concept-search-api";

/// Human readable application name reported by the health endpoints.
pub const APP_NAME: &str = "Concept Search API";

/// Maximum accepted request body size (bytes).
pub const REQUEST_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// SEARCH BACKEND
// =============================================================================

/// Default search cluster endpoint.
pub const ELASTICSEARCH_ENDPOINT: &str = "http://localhost:9200";

/// Default index alias, curated to a conservative set of authorities.
pub const DEFAULT_INDEX: &str = "concepts";

/// Extended index alias exposing every authority.
pub const EXTENDED_INDEX: &str = "all-concepts";

/// Timeout applied to every outbound backend call.
pub const BACKEND_TIMEOUT_SECS: u64 = 60;

/// Transport-level retries for a single backend call.
pub const BACKEND_MAX_RETRIES: u32 = 3;

/// Initial backoff between transport retries; doubles per attempt.
pub const BACKEND_RETRY_BACKOFF_MS: u64 = 100;

/// Wait between attempts to install the backend client at startup.
pub const BACKEND_CONNECT_INTERVAL_SECS: u64 = 60;

// =============================================================================
// PAGE SIZES
// =============================================================================

/// Page size for by-type catalog listings.
pub const SEARCH_RESULT_LIMIT: usize = 50;

/// Page size for typeahead, text-mode and term searches.
pub const AUTOCOMPLETE_RESULT_LIMIT: usize = 10;

/// Maximum number of ids accepted by a by-id lookup.
pub const MAX_IDS_LIMIT: usize = 1000;

// =============================================================================
// PUBLIC IDENTIFIERS
// =============================================================================

/// Prefix of every canonical concept id.
pub const THINGS_URI_PREFIX: &str = "http://api.ft.com/things/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autocomplete_limit_is_smaller_than_search_limit() {
        assert!(AUTOCOMPLETE_RESULT_LIMIT < SEARCH_RESULT_LIMIT);
    }

    #[test]
    fn test_indices_are_distinct() {
        assert_ne!(DEFAULT_INDEX, EXTENDED_INDEX);
    }

    #[test]
    fn test_things_prefix_ends_with_slash() {
        assert!(THINGS_URI_PREFIX.ends_with('/'));
    }
}
