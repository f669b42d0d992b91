//! Error types for the concept search API.

use thiserror::Error;

/// Result type alias using the concept search Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for concept search operations.
///
/// The variants follow the request lifecycle: validation and input errors
/// short-circuit before dispatch, backend errors are classified once when a
/// dispatch returns.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed parameter combination, enumeration violation or missing field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Domain-specific invalid value (unknown type, unsupported boost, ids limit)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The backend returned zero hits where at least one was required
    #[error("Not found: {0}")]
    NotFound(String),

    /// No backend client installed yet, or the backend reports no client
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The search backend returned an error or an unreadable response
    #[error("Search error: {0}")]
    Search(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
