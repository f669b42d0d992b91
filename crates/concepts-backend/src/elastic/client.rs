//! Search cluster client implementation.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, trace, warn};

use concepts_core::{Error, Result};

use super::error::{parse_error_reason, to_search_error, ElasticErrorCode};
use crate::backend::{ClusterHealth, SearchBackend, SearchRequest, SearchResponse};
use crate::config::{BackendAuth, BackendConfig};

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Search backend over the cluster's REST API.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    client: Client,
    config: BackendConfig,
}

impl ElasticClient {
    /// Create a client. Validates the configuration first.
    pub fn new(config: BackendConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "backend",
            component = "elastic_client",
            endpoint = %config.base_url(),
            timeout_secs = config.timeout_seconds,
            max_retries = config.max_retries,
            "Initializing search cluster client"
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url(), path);
        let req = self.client.request(method, url);
        match &self.config.auth {
            BackendAuth::None => req,
            BackendAuth::Basic { username, password } => req.basic_auth(username, Some(password)),
        }
    }

    /// Send a request, retrying connection failures, timeouts and gateway
    /// errors with exponential backoff, and parse the JSON body.
    async fn execute<F>(&self, op: &'static str, build: F) -> Result<Value>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let start = Instant::now();
            let can_retry = attempt <= self.config.max_retries;

            let response = match build().send().await {
                Ok(response) => response,
                Err(e) if can_retry && (e.is_connect() || e.is_timeout()) => {
                    let backoff = self.config.backoff_for(attempt);
                    warn!(
                        op,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Search cluster unreachable, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }
                Err(e) => {
                    return Err(Error::Search(format!("{} request failed: {}", op, e)));
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let code = ElasticErrorCode::from_status(status.as_u16());
                if can_retry && code.is_retryable() {
                    let backoff = self.config.backoff_for(attempt);
                    warn!(
                        op,
                        attempt,
                        status = status.as_u16(),
                        reason = %parse_error_reason(&body),
                        backoff_ms = backoff.as_millis() as u64,
                        "Search cluster returned a gateway error, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }
                return Err(to_search_error(op, status.as_u16(), &body));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| Error::Search(format!("failed to read {} response: {}", op, e)))?;
            let value: Value = serde_json::from_slice(&bytes)
                .map_err(|e| Error::Search(format!("invalid {} response: {}", op, e)))?;

            debug!(
                op,
                attempt,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Search cluster call completed"
            );
            return Ok(value);
        }
    }

    fn search_path(request: &SearchRequest) -> String {
        match request.search_type {
            Some(search_type) => format!("/{}/_search?search_type={}", request.index, search_type),
            None => format!("/{}/_search", request.index),
        }
    }

    /// Encode a bundle as NDJSON: one header line and one body line per
    /// request, with a trailing newline.
    pub(crate) fn encode_msearch(requests: &[SearchRequest]) -> Result<String> {
        let mut payload = String::new();
        for request in requests {
            let mut header = json!({ "index": request.index });
            if let Some(search_type) = request.search_type {
                header["search_type"] = json!(search_type.as_str());
            }
            payload.push_str(&serde_json::to_string(&header)?);
            payload.push('\n');
            payload.push_str(&serde_json::to_string(&request.body)?);
            payload.push('\n');
        }
        Ok(payload)
    }

    /// Split a multi-search response into per-request responses. Any item
    /// error fails the whole bundle.
    pub(crate) fn decode_msearch(value: Value, expected: usize) -> Result<Vec<SearchResponse>> {
        let items = match value {
            Value::Object(mut obj) => match obj.remove("responses") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(Error::Search(
                        "multi-search response has no responses array".to_string(),
                    ))
                }
            },
            _ => {
                return Err(Error::Search(
                    "multi-search response is not an object".to_string(),
                ))
            }
        };

        if items.len() != expected {
            return Err(Error::Search(format!(
                "multi-search returned {} responses for {} queries",
                items.len(),
                expected
            )));
        }

        items
            .into_iter()
            .enumerate()
            .map(|(position, item)| {
                if let Some(error) = item.get("error") {
                    let body = json!({ "error": error }).to_string();
                    return Err(Error::Search(format!(
                        "multi-search query {} failed: {}",
                        position,
                        parse_error_reason(&body)
                    )));
                }
                SearchResponse::from_json(item)
            })
            .collect()
    }
}

#[async_trait]
impl SearchBackend for ElasticClient {
    #[instrument(skip(self, request), fields(
        subsystem = "backend",
        component = "elastic_client",
        op = "search",
        index = %request.index,
    ))]
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let path = Self::search_path(request);
        trace!(body = %request.body, "Search request body");

        let value = self
            .execute("search", || {
                self.request(Method::POST, &path).json(&request.body)
            })
            .await?;

        let response = SearchResponse::from_json(value)?;
        debug!(
            hit_count = response.hits.len(),
            total_hits = response.total_hits,
            "Search completed"
        );
        Ok(response)
    }

    #[instrument(skip(self, requests), fields(
        subsystem = "backend",
        component = "elastic_client",
        op = "multi_search",
        bundle_size = requests.len(),
    ))]
    async fn multi_search(&self, requests: &[SearchRequest]) -> Result<Vec<SearchResponse>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let payload = Self::encode_msearch(requests)?;
        trace!(payload = %payload, "Multi-search payload");

        let value = self
            .execute("multi_search", || {
                self.request(Method::POST, "/_msearch")
                    .header(reqwest::header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)
                    .body(payload.clone())
            })
            .await?;

        Self::decode_msearch(value, requests.len())
    }

    #[instrument(skip(self), fields(
        subsystem = "backend",
        component = "elastic_client",
        op = "cluster_health",
    ))]
    async fn cluster_health(&self) -> Result<ClusterHealth> {
        let value = self
            .execute("cluster_health", || {
                self.request(Method::GET, "/_cluster/health")
            })
            .await?;

        serde_json::from_value(value)
            .map_err(|e| Error::Search(format!("invalid cluster health response: {}", e)))
    }
}
