//! `GET /concepts`: by-type listing, id lookup and typeahead.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use concepts_core::Concept;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{parse_catalog_request, CatalogRequest, QueryParams};

#[derive(Debug, Serialize)]
pub struct ConceptsResponse {
    pub concepts: Vec<Concept>,
}

pub async fn list_concepts(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ConceptsResponse>, ApiError> {
    let request = parse_catalog_request(&QueryParams::from(pairs))?;

    let concepts = match request {
        CatalogRequest::ByIds(ids) => {
            debug!(op = "by_ids", id_count = ids.len(), "Catalog request");
            state.search.find_by_ids(&ids).await?
        }
        CatalogRequest::ByType {
            types,
            include_deprecated,
            scope,
        } => {
            debug!(op = "by_type", ?scope, "Catalog request");
            state
                .search
                .find_by_type(&types, include_deprecated, scope)
                .await?
        }
        CatalogRequest::Search { query, params } => {
            debug!(op = "search", query = %query, boost_authors = params.boost_authors, "Catalog request");
            state.search.search(&query, &params).await?
        }
        CatalogRequest::Text { query, params } => {
            debug!(op = "text", query = %query, "Catalog request");
            state.search.search_text(&query, &params).await?
        }
    };

    Ok(Json(ConceptsResponse { concepts }))
}
