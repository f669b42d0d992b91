//! # concepts-search
//!
//! Query assembly and result projection for the concept search API.
//!
//! This crate provides:
//! - A typed query tree rendered to the search backend's JSON query language
//! - Builders for the term, text-mode, by-type, by-id and best-match queries
//! - Projection of backend hits to public concepts
//! - [`ConceptSearchService`], which ties the above to the dispatcher
//!
//! ## Example
//!
//! ```ignore
//! use concepts_search::{ConceptSearchService, SearchLimits, SearchParams};
//!
//! let service = ConceptSearchService::new(dispatcher, SearchLimits::default());
//! let types = concepts_core::resolve_types(&["http://www.ft.com/ontology/person/Person"])?;
//! let concepts = service.search("Eric", &SearchParams::new(types)).await?;
//! ```

pub mod builder;
pub mod dsl;
pub mod projection;
pub mod service;

pub use builder::QueryOptions;
pub use dsl::{BoolQuery, Query, SearchSource};
pub use projection::{project_hit, project_hits, ProjectionOptions, ResultOrder};
pub use service::{ConceptSearchService, SearchLimits, SearchParams};
