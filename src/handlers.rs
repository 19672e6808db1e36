//! HTTP tool surface for the MISP IOC service
//!
//! Five operations plus an informational endpoint and a health check. Each
//! invocation re-queries MISP and re-normalizes from scratch; no state is
//! shared across calls beyond config and the HTTP client.

use crate::client::MispClient;
use crate::config::Config;
use crate::error::IocError;
use crate::export;
use crate::filter::{filter_by_type, filter_results};
use crate::models::{ConnectionStatus, IocSummary, NormalizedIoc, SaveReport, ServerInfo};
use crate::summary::summarize;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

pub const SERVER_VERSION: &str = "1.0.0";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<MispClient>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/server-info", get(server_info))
        .route("/iocs/recent", get(get_recent_iocs))
        .route("/iocs/summary", get(get_ioc_summary))
        .route("/iocs/type/:ioc_type", get(get_iocs_by_type))
        .route("/iocs/save", post(save_iocs_to_file))
        .route("/connection/check", get(check_connection))
        .with_state(state)
}

async fn fetch_recent(state: &AppState) -> Result<Vec<NormalizedIoc>, IocError> {
    let raw = state.client.search_attributes().await?;
    Ok(filter_results(&raw))
}

/// IOCs added inside the configured window, normalized. An empty vec means
/// the platform had nothing matching; retrieval failures surface as errors.
async fn get_recent_iocs(
    State(state): State<AppState>,
) -> Result<Json<Vec<NormalizedIoc>>, IocError> {
    let iocs = fetch_recent(&state).await?;
    Ok(Json(iocs))
}

/// Summary statistics over the recent window
async fn get_ioc_summary(State(state): State<AppState>) -> Result<Json<IocSummary>, IocError> {
    let iocs = fetch_recent(&state).await?;
    Ok(Json(summarize(&iocs)))
}

/// Case-insensitive type filter; an unmatched type is an empty vec, not an
/// error.
async fn get_iocs_by_type(
    Path(ioc_type): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<NormalizedIoc>>, IocError> {
    let iocs = fetch_recent(&state).await?;
    Ok(Json(filter_by_type(&iocs, &ioc_type)))
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveRequest {
    pub filename: Option<String>,
}

/// Export the recent window to a JSON file. Every failure is captured into
/// the report; this route always answers 200.
async fn save_iocs_to_file(
    State(state): State<AppState>,
    payload: Option<Json<SaveRequest>>,
) -> Json<SaveReport> {
    let filename = payload.and_then(|Json(req)| req.filename);

    let report = match fetch_recent(&state).await {
        Ok(iocs) => export::save_iocs_to_file(&iocs, filename),
        Err(e) => {
            warn!("IOC export failed before writing: {}", e);
            SaveReport::error(format!("Failed to save IOCs: {}", e))
        }
    };

    Json(report)
}

/// Report whether the MISP connection is configured. Checks endpoint and
/// credential presence only; no network round-trip.
async fn check_connection(State(state): State<AppState>) -> Json<ConnectionStatus> {
    let misp = &state.config.misp;

    if misp.url.as_deref().map_or(true, str::is_empty) {
        return Json(ConnectionStatus::error(
            "MISP_URL not found in environment variables",
        ));
    }
    if misp.api_key.as_deref().map_or(true, str::is_empty) {
        return Json(ConnectionStatus::error(
            "MISP_API_KEY not found in environment variables",
        ));
    }

    let status = match misp.credentials() {
        Ok(_) => ConnectionStatus {
            status: "success".to_string(),
            message: "MISP connection configured successfully".to_string(),
            misp_url: misp.url.clone(),
            api_key_configured: Some(true),
        },
        Err(e) => ConnectionStatus::error(e.to_string()),
    };

    Json(status)
}

/// Static document describing the exposed operations
async fn server_info() -> Json<ServerInfo> {
    Json(ServerInfo {
        name: "MISP IOC Server",
        description: "Service for retrieving and normalizing IOCs from MISP",
        version: SERVER_VERSION,
        available_tools: vec![
            "get_recent_iocs - GET /iocs/recent - IOCs from the recent window",
            "get_ioc_summary - GET /iocs/summary - summary statistics of recent IOCs",
            "get_iocs_by_type - GET /iocs/type/:ioc_type - filter IOCs by type",
            "save_iocs_to_file - POST /iocs/save - export IOCs to a JSON file",
            "check_connection - GET /connection/check - verify MISP configuration",
        ],
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "misp-ioc-server",
        "version": SERVER_VERSION
    }))
}
