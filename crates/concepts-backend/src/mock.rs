//! Mock search backend for deterministic testing.
//!
//! Answers searches with canned responses and records every request so
//! tests can assert on the generated query bodies.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use concepts_backend::mock::MockSearchBackend;
//! use concepts_backend::{Hit, SearchBackend, SearchRequest};
//! use serde_json::json;
//!
//! async fn example() {
//!     let backend = MockSearchBackend::new()
//!         .with_hits(vec![Hit::new("a", 1.0, json!({"id": "a"}))]);
//!
//!     let response = backend
//!         .search(&SearchRequest::new("concepts", json!({})))
//!         .await
//!         .unwrap();
//!     assert_eq!(response.hits.len(), 1);
//!     assert_eq!(backend.search_call_count(), 1);
//! }
//! ```
//!
//! Response priority for each query: configured failure, then the
//! responder, then queued responses, then the default response.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use concepts_core::{Error, Result};

use crate::backend::{ClusterHealth, Hit, SearchBackend, SearchRequest, SearchResponse};

/// Computes a response from the request.
pub type Responder = Arc<dyn Fn(&SearchRequest) -> SearchResponse + Send + Sync>;

/// Failure returned instead of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    Unavailable(String),
    Search(String),
}

impl MockFailure {
    fn to_error(&self) -> Error {
        match self {
            Self::Unavailable(msg) => Error::Unavailable(msg.clone()),
            Self::Search(msg) => Error::Search(msg.clone()),
        }
    }
}

/// Mock search backend for testing.
#[derive(Clone)]
pub struct MockSearchBackend {
    config: Arc<MockConfig>,
    queue: Arc<Mutex<VecDeque<SearchResponse>>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Clone)]
struct MockConfig {
    default_response: SearchResponse,
    responder: Option<Responder>,
    failure: Option<MockFailure>,
    health: ClusterHealth,
    health_failure: Option<MockFailure>,
}

/// One recorded backend call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// "search", "multi_search" or "cluster_health".
    pub operation: String,
    /// Requests carried by the call (empty for health checks).
    pub requests: Vec<SearchRequest>,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_response: SearchResponse::default(),
            responder: None,
            failure: None,
            health: ClusterHealth {
                cluster_name: "mock-cluster".to_string(),
                status: "green".to_string(),
                number_of_nodes: 1,
                number_of_data_nodes: 1,
                ..ClusterHealth::default()
            },
            health_failure: None,
        }
    }
}

impl Default for MockSearchBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearchBackend {
    /// Create a mock that answers every query with zero hits.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every query with these hits.
    pub fn with_hits(self, hits: Vec<Hit>) -> Self {
        self.with_default_response(SearchResponse::from_hits(hits))
    }

    /// Answer every query with this response.
    pub fn with_default_response(mut self, response: SearchResponse) -> Self {
        Arc::make_mut(&mut self.config).default_response = response;
        self
    }

    /// Compute each response from its request.
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&SearchRequest) -> SearchResponse + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.config).responder = Some(Arc::new(responder));
        self
    }

    /// Queue responses, consumed one per query in order.
    pub fn with_queued_responses(self, responses: Vec<SearchResponse>) -> Self {
        self.queue.lock().unwrap().extend(responses);
        self
    }

    /// Fail every query.
    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(failure);
        self
    }

    /// Report this cluster health document.
    pub fn with_health(mut self, health: ClusterHealth) -> Self {
        Arc::make_mut(&mut self.config).health = health;
        self
    }

    /// Report this cluster health status.
    pub fn with_health_status(mut self, status: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).health.status = status.into();
        self
    }

    /// Fail health checks.
    pub fn with_health_failure(mut self, failure: MockFailure) -> Self {
        Arc::make_mut(&mut self.config).health_failure = Some(failure);
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    /// Every request sent through `search`, in order.
    pub fn search_requests(&self) -> Vec<SearchRequest> {
        self.requests_for("search")
    }

    /// Every request sent through `multi_search`, flattened, in order.
    pub fn multi_search_requests(&self) -> Vec<SearchRequest> {
        self.requests_for("multi_search")
    }

    /// The most recent request of any kind.
    pub fn last_request(&self) -> Option<SearchRequest> {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|call| call.requests.last().cloned())
    }

    pub fn search_call_count(&self) -> usize {
        self.count("search")
    }

    pub fn multi_search_call_count(&self) -> usize {
        self.count("multi_search")
    }

    fn requests_for(&self, operation: &str) -> Vec<SearchRequest> {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == operation)
            .flat_map(|c| c.requests.clone())
            .collect()
    }

    fn count(&self, operation: &str) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn log_call(&self, operation: &str, requests: Vec<SearchRequest>) {
        self.call_log.lock().unwrap().push(MockCall {
            operation: operation.to_string(),
            requests,
            timestamp: std::time::Instant::now(),
        });
    }

    fn respond(&self, request: &SearchRequest) -> Result<SearchResponse> {
        if let Some(failure) = &self.config.failure {
            return Err(failure.to_error());
        }
        if let Some(responder) = &self.config.responder {
            return Ok(responder(request));
        }
        if let Some(queued) = self.queue.lock().unwrap().pop_front() {
            return Ok(queued);
        }
        Ok(self.config.default_response.clone())
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.log_call("search", vec![request.clone()]);
        self.respond(request)
    }

    async fn multi_search(&self, requests: &[SearchRequest]) -> Result<Vec<SearchResponse>> {
        self.log_call("multi_search", requests.to_vec());
        requests.iter().map(|r| self.respond(r)).collect()
    }

    async fn cluster_health(&self) -> Result<ClusterHealth> {
        self.log_call("cluster_health", Vec::new());
        match &self.config.health_failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(self.config.health.clone()),
        }
    }
}
