//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::IndexOutcome;
use super::config::MetricsConfig;

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});
static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());
static WORKFLOW_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/api/workflows/[^/]+(/|$)").unwrap());

const MAX_PATH_LABEL_LEN: usize = 50;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_default_metrics();

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    gauge!("workflow_catalog_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
    gauge!("workflow_reindex_running").set(0.0);
}

/// Create the metrics router serving `path`
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Count a request rejected by the rate limiter
pub fn record_rate_limited() {
    counter!("http_rate_limited_total").increment(1);
}

/// Mark a reindex run as started
pub fn record_reindex_started(force: bool) {
    counter!("workflow_reindex_runs_total", "force" => force.to_string()).increment(1);
    gauge!("workflow_reindex_running").set(1.0);
}

/// Record the end of a reindex run; `None` when the run failed
pub fn record_reindex_finished(outcome: Option<&IndexOutcome>, duration: Duration) {
    gauge!("workflow_reindex_running").set(0.0);

    let status = if outcome.is_some() { "success" } else { "error" };
    counter!("workflow_reindex_completed_total", "status" => status).increment(1);
    histogram!("workflow_reindex_duration_seconds").record(duration.as_secs_f64());

    if let Some(outcome) = outcome {
        counter!("workflow_index_processed_total").increment(outcome.processed as u64);
        counter!("workflow_index_skipped_total").increment(outcome.skipped as u64);
        counter!("workflow_index_errors_total").increment(outcome.errors as u64);
    }
}

/// Sanitize URL path for metric labels (collapse identifiers, limit cardinality)
fn sanitize_path(path: &str) -> String {
    let path = WORKFLOW_FILENAME.replace(path, "/api/workflows/{filename}$1");
    let path = UUID_SEGMENT.replace_all(&path, "{id}");
    let path = NUMERIC_SEGMENT.replace_all(&path, "/{id}$1");

    path.chars().take(MAX_PATH_LABEL_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_workflow_filename() {
        assert_eq!(
            sanitize_path("/api/workflows/slack_alerts.json"),
            "/api/workflows/{filename}"
        );
        assert_eq!(
            sanitize_path("/api/workflows/slack_alerts.json/diagram"),
            "/api/workflows/{filename}/diagram"
        );
    }

    #[test]
    fn test_sanitize_path_keeps_listing() {
        assert_eq!(sanitize_path("/api/workflows"), "/api/workflows");
        assert_eq!(sanitize_path("/health"), "/health");
    }

    #[test]
    fn test_sanitize_path_uuid() {
        let path = "/files/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(sanitize_path(path), "/files/{id}");
    }

    #[test]
    fn test_sanitize_path_numeric_id() {
        assert_eq!(sanitize_path("/assets/123/logo.png"), "/assets/{id}/logo.png");
    }

    #[test]
    fn test_sanitize_path_truncates_long_paths() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        assert!(sanitize_path(path).len() <= MAX_PATH_LABEL_LEN);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_http_request("GET", "/api/stats", 200, Duration::from_millis(3));
        record_reindex_started(false);
        record_reindex_finished(Some(&IndexOutcome::default()), Duration::from_secs(1));
        record_reindex_finished(None, Duration::from_secs(1));
    }
}
