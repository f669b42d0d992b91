//! Operational endpoints: `/__health`, `/__health-details`, `/__gtg`,
//! `/__build-info`.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use concepts_backend::ClusterHealth;
use concepts_core::Result;

use crate::error::ApiError;
use crate::state::AppState;

const PANIC_GUIDE: &str = "Check the search cluster endpoint and credentials, then restart the service";

/// One entry of the aggregated health document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub id: &'static str,
    pub name: &'static str,
    pub ok: bool,
    pub severity: u8,
    pub business_impact: &'static str,
    pub technical_summary: &'static str,
    pub panic_guide: &'static str,
    pub check_output: String,
    pub last_updated: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub schema_version: u8,
    pub system_code: String,
    pub name: String,
    pub description: &'static str,
    pub checks: Vec<HealthCheck>,
    pub ok: bool,
}

async fn cluster_health(state: &AppState) -> Result<ClusterHealth> {
    state.backend.current().await?.cluster_health().await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Aggregated health; always 200.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = cluster_health(&state).await;

    let connectivity = HealthCheck {
        id: "search-backend-connectivity",
        name: "Search cluster connectivity",
        ok: snapshot.is_ok(),
        severity: 1,
        business_impact: "Concept search and lookup are unavailable",
        technical_summary: "The search cluster client is not installed or the cluster is unreachable",
        panic_guide: PANIC_GUIDE,
        check_output: match &snapshot {
            Ok(_) => "Successfully connected to the search cluster".to_string(),
            Err(e) => e.to_string(),
        },
        last_updated: now(),
    };

    let cluster = HealthCheck {
        id: "search-backend-cluster-health",
        name: "Search cluster health",
        ok: matches!(&snapshot, Ok(health) if health.is_green()),
        severity: 2,
        business_impact: "Search results may be incomplete or slow",
        technical_summary: "The search cluster reports a status other than green",
        panic_guide: PANIC_GUIDE,
        check_output: match &snapshot {
            Ok(health) => format!("Cluster status is {}", health.status),
            Err(e) => e.to_string(),
        },
        last_updated: now(),
    };

    if let Err(e) = &snapshot {
        warn!(subsystem = "api", component = "health", error = %e, "Search cluster unhealthy");
    }

    let ok = connectivity.ok && cluster.ok;
    Json(HealthResponse {
        schema_version: 1,
        system_code: state.system_code.clone(),
        name: state.app_name.clone(),
        description: "Search and lookup of concepts from the editorial taxonomy",
        checks: vec![connectivity, cluster],
        ok,
    })
}

/// Raw cluster-health document.
pub async fn health_details(
    State(state): State<AppState>,
) -> std::result::Result<Json<ClusterHealth>, ApiError> {
    cluster_health(&state)
        .await
        .map(Json)
        .map_err(|e| ApiError::Unavailable(e.to_string()))
}

/// Good-to-go: the cluster is reachable.
pub async fn gtg(State(state): State<AppState>) -> impl IntoResponse {
    match cluster_health(&state).await {
        Ok(_) => (StatusCode::OK, "OK".to_string()),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
    }
}

pub async fn build_info() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
