//! Query dispatch.
//!
//! Chooses the target index for a query, attaches the scoring mode and sends
//! it through whatever client is currently installed in the
//! [`BackendHandle`]. Multiple queries for one request go out as a single
//! multi-search bundle.

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use concepts_core::{defaults, Error, Result};

use crate::backend::{SearchRequest, SearchResponse, SearchType};
use crate::handle::BackendHandle;

/// The two index aliases the service reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNames {
    /// Curated alias with a conservative set of authorities.
    pub default: String,
    /// Alias exposing every authority.
    pub extended: String,
}

impl Default for IndexNames {
    fn default() -> Self {
        Self {
            default: defaults::DEFAULT_INDEX.to_string(),
            extended: defaults::EXTENDED_INDEX.to_string(),
        }
    }
}

impl IndexNames {
    pub fn new(default: impl Into<String>, extended: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            extended: extended.into(),
        }
    }

    pub fn resolve(&self, scope: IndexScope) -> &str {
        match scope {
            IndexScope::Default => &self.default,
            IndexScope::Extended => &self.extended,
        }
    }
}

/// Which alias a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexScope {
    #[default]
    Default,
    Extended,
}

impl IndexScope {
    /// `searchAllAuthorities=true` widens the search to the extended alias.
    pub fn from_search_all_authorities(search_all: bool) -> Self {
        if search_all {
            Self::Extended
        } else {
            Self::Default
        }
    }
}

/// A query ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub scope: IndexScope,
    pub search_type: Option<SearchType>,
    pub body: Value,
}

impl Dispatch {
    pub fn new(scope: IndexScope, body: Value) -> Self {
        Self {
            scope,
            search_type: None,
            body,
        }
    }

    /// Use global term statistics for scoring.
    pub fn dfs(mut self) -> Self {
        self.search_type = Some(SearchType::DfsQueryThenFetch);
        self
    }
}

/// Sends queries to the installed backend.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    handle: BackendHandle,
    indices: IndexNames,
}

impl Dispatcher {
    pub fn new(handle: BackendHandle, indices: IndexNames) -> Self {
        Self { handle, indices }
    }

    pub fn handle(&self) -> &BackendHandle {
        &self.handle
    }

    pub fn indices(&self) -> &IndexNames {
        &self.indices
    }

    fn to_request(&self, dispatch: Dispatch) -> SearchRequest {
        SearchRequest {
            index: self.indices.resolve(dispatch.scope).to_string(),
            body: dispatch.body,
            search_type: dispatch.search_type,
        }
    }

    /// Send a single query.
    #[instrument(skip(self, dispatch), fields(
        subsystem = "backend",
        component = "dispatcher",
        op = "search",
        index = %self.indices.resolve(dispatch.scope),
    ))]
    pub async fn dispatch(&self, dispatch: Dispatch) -> Result<SearchResponse> {
        let backend = self.handle.current().await?;
        let request = self.to_request(dispatch);
        let start = Instant::now();

        let response = backend
            .search(&request)
            .await
            .map_err(|e| classify("search", e))?;

        debug!(
            hit_count = response.hits.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Dispatched query"
        );
        Ok(response)
    }

    /// Send several queries as one bundle. Responses come back in the same
    /// order as the queries.
    #[instrument(skip(self, dispatches), fields(
        subsystem = "backend",
        component = "dispatcher",
        op = "multi_search",
        bundle_size = dispatches.len(),
    ))]
    pub async fn dispatch_bundle(&self, dispatches: Vec<Dispatch>) -> Result<Vec<SearchResponse>> {
        if dispatches.is_empty() {
            return Ok(Vec::new());
        }

        let backend = self.handle.current().await?;
        let requests: Vec<SearchRequest> = dispatches
            .into_iter()
            .map(|dispatch| self.to_request(dispatch))
            .collect();
        let start = Instant::now();

        let responses = backend
            .multi_search(&requests)
            .await
            .map_err(|e| classify("multi_search", e))?;

        if responses.len() != requests.len() {
            return Err(Error::Search(format!(
                "multi-search returned {} responses for {} queries",
                responses.len(),
                requests.len()
            )));
        }

        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Dispatched query bundle"
        );
        Ok(responses)
    }
}

/// Keep `Unavailable` as is; every other backend failure surfaces as a
/// search error.
fn classify(op: &str, err: Error) -> Error {
    match err {
        Error::Unavailable(_) | Error::Search(_) => {
            warn!(op, error = %err, "Backend call failed");
            err
        }
        other => {
            warn!(op, error = %other, "Backend call failed");
            Error::Search(other.to_string())
        }
    }
}
