//! Index command - builds the catalog index once and reports on it

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde_json::json;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::WorkflowStore;
use crate::infrastructure::logging;
use crate::infrastructure::services::ReindexService;
use crate::infrastructure::workflow::{InMemoryWorkflowStore, WorkflowLoader};

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Workflow directory, overrides `catalog.workflows_dir`
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Index the directory and print counts and catalog stats as JSON.
///
/// Useful for checking a directory of exports before serving it.
pub async fn run(args: IndexArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let dir = args.dir.unwrap_or(config.catalog.workflows_dir);
    let loader = WorkflowLoader::new(dir);
    info!(dir = %loader.dir().display(), "Indexing workflows");

    let store: Arc<dyn WorkflowStore> = Arc::new(InMemoryWorkflowStore::new(loader));
    let outcome = ReindexService::new(store.clone()).run(true).await?;
    let stats = store.get_stats().await?;

    let report = json!({ "outcome": outcome, "stats": stats });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
