//! # concepts-core
//!
//! Core types, error taxonomy and the concept-type registry shared by the
//! concept search crates.

pub mod concept_types;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use concept_types::{resolve_types, validate_for_authors_search, ResolvedTypes};
pub use error::{Error, Result};
pub use models::*;
pub use uuid_utils::{canonical_id, extract_uuid};
