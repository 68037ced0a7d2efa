//! Workflow search, detail, download and diagram endpoints

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, LenientQuery};
use crate::domain::{DiagramIdScheme, SearchParams, SearchQuery, SearchResult, Workflow};

/// Query string of the diagram endpoint
#[derive(Debug, Default, Deserialize)]
pub struct DiagramParams {
    /// `ordinal` selects position-based vertex ids; anything else is ignored
    pub ids: Option<String>,
}

impl DiagramParams {
    fn scheme(&self) -> DiagramIdScheme {
        match self.ids.as_deref() {
            Some(ids) if ids.eq_ignore_ascii_case("ordinal") => DiagramIdScheme::Ordinal,
            _ => DiagramIdScheme::Sanitized,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiagramResponse {
    pub diagram: String,
}

/// GET /api/workflows
pub async fn search_workflows(
    State(state): State<AppState>,
    LenientQuery(params): LenientQuery<SearchParams>,
) -> Result<Json<SearchResult>, ApiError> {
    let query = SearchQuery::from(params);

    let result = state
        .catalog
        .search(query)
        .await
        .map_err(state.fail("Error searching workflows"))?;

    Ok(Json(result))
}

/// GET /api/workflows/{filename}
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<Workflow>, ApiError> {
    let workflow = state
        .catalog
        .workflow(&filename)
        .await
        .map_err(state.fail("Error fetching workflow detail"))?;

    Ok(Json(workflow))
}

/// GET /api/workflows/{filename}/download
pub async fn download_workflow(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state
        .catalog
        .download(&filename)
        .await
        .map_err(state.fail("Error downloading workflow"))?;

    debug!(filename = %filename, size = bytes.len(), "Serving workflow download");

    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// GET /api/workflows/{filename}/diagram
pub async fn get_diagram(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    LenientQuery(params): LenientQuery<DiagramParams>,
) -> Result<Json<DiagramResponse>, ApiError> {
    let diagram = state
        .catalog
        .diagram(&filename, params.scheme())
        .await
        .map_err(state.fail("Error generating diagram"))?;

    Ok(Json(DiagramResponse { diagram }))
}
