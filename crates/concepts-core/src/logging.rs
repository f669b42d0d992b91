//! Structured logging schema and field name constants.
//!
//! All crates use these constants for consistent structured logging fields so
//! log aggregation can query by the same names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue (skipped hit, backend retry, connect retry) |
//! | INFO  | Lifecycle events (startup, backend installed, shutdown) |
//! | DEBUG | Decision points (mode, index, page size) |
//! | TRACE | Query bodies and raw backend payloads |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "search", "backend"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "dispatcher", "projector", "elastic_client", "backend_handle"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "search", "multi_search", "cluster_health", "best_match"
pub const OPERATION: &str = "op";

// ─── Request fields ────────────────────────────────────────────────────────

/// Free-text query.
pub const QUERY: &str = "query";

/// Query mode ("search", "text", "by_type", "by_ids", "term", "best_match").
pub const MODE: &str = "mode";

/// Target index alias.
pub const INDEX: &str = "index";

/// Concept id being projected.
pub const CONCEPT_ID: &str = "concept_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of concepts returned.
pub const RESULT_COUNT: &str = "result_count";

/// Number of raw backend hits before projection.
pub const HIT_COUNT: &str = "hit_count";

/// Number of queries in a multi-search bundle.
pub const BUNDLE_SIZE: &str = "bundle_size";

/// Transport attempt number (1-based).
pub const ATTEMPT: &str = "attempt";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// HTTP status returned by the backend.
pub const STATUS: &str = "status";
