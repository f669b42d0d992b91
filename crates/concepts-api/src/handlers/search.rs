//! `POST /concept/search`: term search or best-match batch.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use concepts_core::Concept;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{parse_search_body, parse_search_flags, QueryParams, SearchBody};

#[derive(Debug, Serialize)]
pub struct TermResponse {
    pub results: Vec<Concept>,
}

/// Best-match responses are keyed by candidate string.
pub type BestMatchResponse = BTreeMap<String, Vec<Concept>>;

pub async fn search_concepts(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let flags = parse_search_flags(&QueryParams::from(pairs))?;

    match parse_search_body(&body, &flags)? {
        SearchBody::Term { term, params } => {
            let results = state.search.search_term(&term, &params).await?;
            Ok(Json(TermResponse { results }).into_response())
        }
        SearchBody::BestMatch { terms, params } => {
            let results: BestMatchResponse = state.search.best_match(&terms, &params).await?;
            Ok(Json(results).into_response())
        }
    }
}
