//! # concepts-api
//!
//! HTTP surface of the concept search service.
//!
//! | Path | Method | Purpose |
//! |---|---|---|
//! | `/concept/search` | POST | Term search or best-match batch |
//! | `/concepts` | GET | By-type listing, id lookup, typeahead |
//! | `/__health` | GET | Aggregated health |
//! | `/__health-details` | GET | Cluster-health snapshot |
//! | `/__gtg` | GET | Readiness |
//! | `/__build-info` | GET | Name and version |

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use concepts_core::defaults;

pub use config::Cli;
pub use error::ApiError;
pub use state::AppState;

/// Build the router with every route and layer.
pub fn build_router(state: AppState) -> Router {
    let catalog = Router::new()
        .route("/concepts", get(handlers::list_concepts))
        .route_layer(axum::middleware::from_fn(middleware::require_json));

    Router::new()
        .route("/concept/search", post(handlers::search_concepts))
        .merge(catalog)
        .route("/__health", get(handlers::health))
        .route("/__health-details", get(handlers::health_details))
        .route("/__gtg", get(handlers::gtg))
        .route("/__build-info", get(handlers::build_info))
        .layer(TraceLayer::new_for_http().make_span_with(middleware::make_request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuidV7))
        .layer(RequestBodyLimitLayer::new(defaults::REQUEST_BODY_LIMIT))
        .with_state(state)
}
