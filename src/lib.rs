//! Workflow Catalog
//!
//! Indexes a directory of n8n workflow exports and serves them over HTTP:
//! - paginated, filterable search
//! - integration-based categories
//! - Mermaid diagrams of workflow graphs
//! - single-flight background reindexing

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::WorkflowStore;
use infrastructure::{
    services::{CatalogService, CatalogServiceConfig, ReindexService},
    workflow::{InMemoryWorkflowStore, WorkflowLoader},
};
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state and build the initial index
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let loader = WorkflowLoader::new(&config.catalog.workflows_dir);
    let store = create_store(loader.clone()).await?;

    let catalog = CatalogService::new(store.clone())
        .with_loader(loader)
        .with_config(CatalogServiceConfig {
            category_scan_limit: config.catalog.category_scan_limit,
        });
    let reindex = ReindexService::new(store);

    Ok(AppState::new(Arc::new(catalog), Arc::new(reindex))
        .with_diagnostics(config.server.diagnostics))
}

/// Create the workflow store for `loader`'s directory and initialize it
pub async fn create_store(loader: WorkflowLoader) -> anyhow::Result<Arc<dyn WorkflowStore>> {
    let dir = loader.dir().display().to_string();
    let store: Arc<dyn WorkflowStore> = Arc::new(InMemoryWorkflowStore::new(loader));

    store
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize workflow store: {}", e))?;

    let stats = store
        .get_stats()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read catalog stats: {}", e))?;
    info!(dir = %dir, workflows = stats.total, "Workflow store ready");

    Ok(store)
}
