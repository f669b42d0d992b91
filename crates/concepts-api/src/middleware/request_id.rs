//! Request correlation ids.

use axum::{body::Body, http::Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::{field, info_span, Span};
use uuid::Uuid;

use concepts_core::logging;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generates time-ordered UUIDv7 `x-request-id` values, so ids sort by
/// arrival time in the logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Request span carrying the correlation id set by [`MakeRequestUuidV7`]
/// (or sent by the caller).
pub fn make_request_span(request: &Request<Body>) -> Span {
    let span = info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = field::Empty,
    );
    if let Some(id) = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        span.record(logging::REQUEST_ID, id);
    }
    span
}
