//! Background reindex endpoints

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, LenientJson};
use crate::infrastructure::services::{ReindexStatus, ReindexTrigger};

/// Body of `POST /api/reindex`
#[derive(Debug, Default, Deserialize)]
pub struct ReindexRequest {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct ReindexResponse {
    pub message: String,
}

/// POST /api/reindex
pub async fn trigger_reindex(
    State(state): State<AppState>,
    LenientJson(request): LenientJson<ReindexRequest>,
) -> Result<Json<ReindexResponse>, ApiError> {
    match state.reindex.trigger(request.force) {
        ReindexTrigger::Started => {
            info!(force = request.force, "Reindex started from API");
            Ok(Json(ReindexResponse {
                message: "Indexing started in background".to_string(),
            }))
        }
        ReindexTrigger::AlreadyRunning => Err(ApiError::new(
            StatusCode::CONFLICT,
            "Indexing already in progress",
        )),
    }
}

/// GET /api/reindex
///
/// Failure messages are only reported in diagnostics mode.
pub async fn reindex_status(State(state): State<AppState>) -> Json<ReindexStatus> {
    let status = state.reindex.status();
    if state.diagnostics {
        Json(status)
    } else {
        Json(status.redacted())
    }
}
