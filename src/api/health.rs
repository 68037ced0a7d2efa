//! Health check endpoints

use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::warn;

use crate::infrastructure::services::{REINDEX_FAILED, ReindexStatus};
use super::state::AppState;

/// Health response with component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Health check status
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// GET /health
///
/// Reports the catalog store and the last reindex run. A failed reindex
/// degrades the service but it keeps serving the previous index.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let checks = vec![
        check_catalog(&state).await,
        check_reindex(&state.reindex.status(), state.diagnostics),
    ];

    let overall_status = overall(&checks);
    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match overall_status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// GET /live
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

fn overall(checks: &[HealthCheck]) -> HealthStatus {
    if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
        HealthStatus::Unhealthy
    } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

async fn check_catalog(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    let (status, message) = match state.catalog.stats().await {
        Ok(stats) => (HealthStatus::Healthy, Some(format!("{} workflows", stats.total))),
        Err(e) => {
            warn!(error = %e, "Catalog health check failed");
            let message = if state.diagnostics {
                e.to_string()
            } else {
                "catalog unavailable".to_string()
            };
            (HealthStatus::Unhealthy, Some(message))
        }
    };

    HealthCheck {
        name: "catalog".to_string(),
        status,
        message,
        latency_ms: Some(start.elapsed().as_millis() as u64),
    }
}

fn check_reindex(status: &ReindexStatus, diagnostics: bool) -> HealthCheck {
    let (health, message) = match status {
        ReindexStatus::Failed { error, .. } if diagnostics => {
            (HealthStatus::Degraded, Some(error.clone()))
        }
        ReindexStatus::Failed { .. } => (HealthStatus::Degraded, Some(REINDEX_FAILED.to_string())),
        ReindexStatus::Running { .. } => (HealthStatus::Healthy, Some("running".to_string())),
        _ => (HealthStatus::Healthy, None),
    };

    HealthCheck {
        name: "reindex".to_string(),
        status: health,
        message,
        latency_ms: None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use super::*;

    fn check(status: HealthStatus) -> HealthCheck {
        HealthCheck {
            name: "c".to_string(),
            status,
            message: None,
            latency_ms: None,
        }
    }

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(serde_json::to_string(&HealthStatus::Healthy).unwrap(), "\"healthy\"");
        assert_eq!(serde_json::to_string(&HealthStatus::Degraded).unwrap(), "\"degraded\"");
        assert_eq!(serde_json::to_string(&HealthStatus::Unhealthy).unwrap(), "\"unhealthy\"");
    }

    #[test]
    fn test_overall_takes_worst() {
        assert_eq!(overall(&[]), HealthStatus::Healthy);
        assert_eq!(
            overall(&[check(HealthStatus::Healthy), check(HealthStatus::Degraded)]),
            HealthStatus::Degraded
        );
        assert_eq!(
            overall(&[check(HealthStatus::Unhealthy), check(HealthStatus::Degraded)]),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn test_failed_reindex_degrades() {
        let failed = ReindexStatus::Failed {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            force: false,
            error: "disk unreadable".to_string(),
        };

        let check = check_reindex(&failed, true);
        assert_eq!(check.status, HealthStatus::Degraded);
        assert_eq!(check.message.as_deref(), Some("disk unreadable"));

        let check = check_reindex(&failed, false);
        assert_eq!(check.status, HealthStatus::Degraded);
        assert_eq!(check.message.as_deref(), Some("reindex failed"));

        assert_eq!(check_reindex(&ReindexStatus::Idle, false).status, HealthStatus::Healthy);
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "1.0.0".to_string(),
            checks: None,
            latency_ms: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
        assert!(!json.contains("checks"));
    }
}
