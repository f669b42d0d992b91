//! HTTP handlers.

pub mod concepts;
pub mod health;
pub mod search;

pub use concepts::list_concepts;
pub use health::{build_info, gtg, health, health_details};
pub use search::search_concepts;
