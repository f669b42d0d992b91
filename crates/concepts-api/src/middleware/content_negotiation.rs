//! `Accept` header check for the catalog endpoint.

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Whether the `Accept` headers allow a JSON response. No header, or an
/// empty one, accepts anything.
pub fn accepts_json(headers: &HeaderMap) -> bool {
    let values: Vec<&str> = headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if values.iter().all(|value| value.trim().is_empty()) {
        return true;
    }
    values
        .iter()
        .any(|value| value.contains("application/json") || value.contains("*/*"))
}

/// Reject with 406 and no body before the handler runs.
pub async fn require_json(request: Request, next: Next) -> Response {
    if !accepts_json(request.headers()) {
        debug!(
            subsystem = "api",
            component = "content_negotiation",
            path = %request.uri().path(),
            "Rejecting request that does not accept JSON"
        );
        return StatusCode::NOT_ACCEPTABLE.into_response();
    }
    next.run(request).await
}
