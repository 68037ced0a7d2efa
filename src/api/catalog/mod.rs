//! Workflow catalog API endpoints

pub mod listings;
pub mod reindex;
pub mod workflows;

use axum::{Router, routing::get};

use super::state::AppState;

/// Create the catalog API router
pub fn create_catalog_router() -> Router<AppState> {
    Router::new()
        .route("/workflows", get(workflows::search_workflows))
        .route("/workflows/{filename}", get(workflows::get_workflow))
        .route(
            "/workflows/{filename}/download",
            get(workflows::download_workflow),
        )
        .route("/workflows/{filename}/diagram", get(workflows::get_diagram))
        .route("/categories", get(listings::list_categories))
        .route("/integrations", get(listings::list_integrations))
        .route("/stats", get(listings::get_stats))
        .route(
            "/reindex",
            get(reindex::reindex_status).post(reindex::trigger_reindex),
        )
}
