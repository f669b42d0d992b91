//! Request middleware.

pub mod content_negotiation;
pub mod request_id;

pub use content_negotiation::require_json;
pub use request_id::{make_request_span, MakeRequestUuidV7};
