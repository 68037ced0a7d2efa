//! Catalog-wide listings: categories, integrations, stats

use std::collections::BTreeSet;

use axum::{Json, extract::State};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::{CatalogStats, CategorizedWorkflows};

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategorizedWorkflows>, ApiError> {
    let categories = state
        .catalog
        .categories()
        .await
        .map_err(state.fail("Error fetching categories"))?;

    Ok(Json(categories))
}

/// GET /api/integrations
pub async fn list_integrations(
    State(state): State<AppState>,
) -> Result<Json<BTreeSet<String>>, ApiError> {
    let integrations = state
        .catalog
        .integrations()
        .await
        .map_err(state.fail("Error fetching integrations"))?;

    Ok(Json(integrations))
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<CatalogStats>, ApiError> {
    let stats = state
        .catalog
        .stats()
        .await
        .map_err(state.fail("Error fetching stats"))?;

    Ok(Json(stats))
}
