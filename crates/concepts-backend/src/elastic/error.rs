//! Search cluster error handling.

use serde_json::Value;

use concepts_core::Error;

/// Coarse classification of a non-2xx cluster response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElasticErrorCode {
    /// 401/403: credentials rejected.
    Unauthorized,
    /// 404: index or alias missing.
    IndexNotFound,
    /// 400: the cluster rejected the query body.
    BadQuery,
    /// 429: too many requests.
    Rejected,
    /// 502/503/504: gateway or node temporarily unavailable.
    Unavailable,
    /// Any other 5xx.
    ServerError,
    Unknown,
}

impl ElasticErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::IndexNotFound,
            400 => Self::BadQuery,
            429 => Self::Rejected,
            502..=504 => Self::Unavailable,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Whether the call may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// Pull `error.type: error.reason` out of a cluster error body.
///
/// The cluster sends either `{"error": {"type", "reason"}}` or a bare
/// `{"error": "..."}`; anything else falls back to the raw text.
pub fn parse_error_reason(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));
    match error {
        Some(Value::String(reason)) => reason.clone(),
        Some(Value::Object(obj)) => {
            let kind = obj.get("type").and_then(Value::as_str);
            let reason = obj.get("reason").and_then(Value::as_str);
            match (kind, reason) {
                (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
                (Some(kind), None) => kind.to_string(),
                (None, Some(reason)) => reason.to_string(),
                (None, None) => Value::Object(obj.clone()).to_string(),
            }
        }
        _ if body.trim().is_empty() => "no response body".to_string(),
        _ => body.trim().to_string(),
    }
}

/// Build the search error for a failed cluster call.
pub fn to_search_error(op: &str, status: u16, body: &str) -> Error {
    let code = ElasticErrorCode::from_status(status);
    let reason = parse_error_reason(body);
    match code {
        ElasticErrorCode::Unauthorized => {
            Error::Search(format!("{} unauthorized ({}): {}", op, status, reason))
        }
        _ => Error::Search(format!("{} failed with status {}: {}", op, status, reason)),
    }
}
