//! Search backend capability.
//!
//! The rest of the service only ever sees this narrow surface: a single
//! search, a multi-search bundle, and the cluster health document. The HTTP
//! client in [`crate::elastic`] is the production implementation; the mock in
//! [`crate::mock`] answers with canned responses in tests.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use concepts_core::{Error, Result};

/// Scoring mode sent with a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Shard-local term statistics (backend default).
    QueryThenFetch,
    /// Global term statistics gathered before scoring, so scores are
    /// comparable across shards.
    DfsQueryThenFetch,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryThenFetch => "query_then_fetch",
            Self::DfsQueryThenFetch => "dfs_query_then_fetch",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One search against one index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Index or alias name.
    pub index: String,
    /// Request body (`query`, `size`, `sort`, `min_score`, ...).
    pub body: Value,
    /// Scoring mode; `None` leaves the backend default.
    pub search_type: Option<SearchType>,
}

impl SearchRequest {
    pub fn new(index: impl Into<String>, body: Value) -> Self {
        Self {
            index: index.into(),
            body,
            search_type: None,
        }
    }

    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }
}

/// A single backend hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index", default)]
    pub index: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
}

impl Hit {
    pub fn new(id: impl Into<String>, score: f64, source: Value) -> Self {
        Self {
            index: None,
            id: Some(id.into()),
            score: Some(score),
            source: Some(source),
        }
    }
}

/// Total hit counter; older clusters send a bare integer, newer ones an
/// object with a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Object {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            Self::Count(n) => *n,
            Self::Object { value, .. } => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawHits {
    total: Option<TotalHits>,
    hits: Option<Vec<Hit>>,
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    #[serde(default)]
    took: Option<u64>,
    #[serde(default)]
    timed_out: bool,
    hits: Option<RawHits>,
}

/// A parsed search response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub total_hits: u64,
    pub hits: Vec<Hit>,
    pub took_ms: Option<u64>,
    pub timed_out: bool,
}

impl SearchResponse {
    /// Build a response from hits, with `total_hits` equal to their count.
    pub fn from_hits(hits: Vec<Hit>) -> Self {
        Self {
            total_hits: hits.len() as u64,
            hits,
            took_ms: None,
            timed_out: false,
        }
    }

    /// Parse a raw search response document.
    ///
    /// Truncated or structurally invalid documents (missing `hits`, missing
    /// or non-numeric `total`) are a search error, never a panic.
    pub fn from_json(value: Value) -> Result<Self> {
        let raw: RawSearchResponse = serde_json::from_value(value)
            .map_err(|e| Error::Search(format!("invalid search response: {}", e)))?;
        let hits = raw
            .hits
            .ok_or_else(|| Error::Search("search response has no hits section".to_string()))?;
        let total_hits = hits
            .total
            .as_ref()
            .map(TotalHits::value)
            .ok_or_else(|| Error::Search("search response has no total hits".to_string()))?;
        let hits = hits
            .hits
            .ok_or_else(|| Error::Search("search response has no hits array".to_string()))?;

        Ok(Self {
            total_hits,
            hits,
            took_ms: raw.took,
            timed_out: raw.timed_out,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Cluster health document, passed through to `/__health-details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterHealth {
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub number_of_nodes: u64,
    #[serde(default)]
    pub number_of_data_nodes: u64,
    #[serde(default)]
    pub active_primary_shards: u64,
    #[serde(default)]
    pub active_shards: u64,
    #[serde(default)]
    pub relocating_shards: u64,
    #[serde(default)]
    pub initializing_shards: u64,
    #[serde(default)]
    pub unassigned_shards: u64,
    /// Any other counters the cluster reports.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ClusterHealth {
    pub fn is_green(&self) -> bool {
        self.status == "green"
    }
}

/// Narrow capability over the search cluster.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one search.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Run several searches in one round-trip. Responses are returned in
    /// request order.
    async fn multi_search(&self, requests: &[SearchRequest]) -> Result<Vec<SearchResponse>>;

    /// Fetch the cluster health document.
    async fn cluster_health(&self) -> Result<ClusterHealth>;
}
