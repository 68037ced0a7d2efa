//! Catalog service - read-side operations used by the HTTP layer

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::workflow::{
    CategorizedWorkflows, DiagramIdScheme, QueryEngine, SearchFilter, SearchQuery, SearchResult,
    WorkflowSummary, categorize, distinct_integrations, render_with,
};
use crate::domain::{CatalogStats, DomainError, Workflow, WorkflowStore};
use crate::infrastructure::workflow::WorkflowLoader;

/// Default number of workflows scanned for category and integration listings
pub const DEFAULT_CATEGORY_SCAN_LIMIT: usize = 1000;

/// Catalog service configuration
#[derive(Debug, Clone)]
pub struct CatalogServiceConfig {
    /// Upper bound on workflows fetched for categories and integrations
    pub category_scan_limit: usize,
}

impl Default for CatalogServiceConfig {
    fn default() -> Self {
        Self {
            category_scan_limit: DEFAULT_CATEGORY_SCAN_LIMIT,
        }
    }
}

/// Facade over the workflow store and the pure catalog components
pub struct CatalogService {
    store: Arc<dyn WorkflowStore>,
    engine: QueryEngine,
    loader: Option<WorkflowLoader>,
    config: CatalogServiceConfig,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("loader", &self.loader)
            .field("config", &self.config)
            .finish()
    }
}

impl CatalogService {
    pub fn new(store: Arc<dyn WorkflowStore>) -> Self {
        Self {
            engine: QueryEngine::new(store.clone()),
            store,
            loader: None,
            config: CatalogServiceConfig::default(),
        }
    }

    /// Serve downloads from the directory behind `loader`
    pub fn with_loader(mut self, loader: WorkflowLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_config(mut self, config: CatalogServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &Arc<dyn WorkflowStore> {
        &self.store
    }

    #[instrument(skip(self), fields(q = %query.filter.query, page = query.page))]
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResult, DomainError> {
        self.engine.search(query).await
    }

    /// Full workflow record; `NotFound` when the filename is not indexed
    #[instrument(skip(self))]
    pub async fn workflow(&self, filename: &str) -> Result<Workflow, DomainError> {
        self.store
            .get_workflow_detail(filename)
            .await?
            .ok_or_else(|| DomainError::not_found("Workflow not found"))
    }

    /// Mermaid diagram of a workflow's graph.
    ///
    /// `NotFound` both when the workflow is unknown and when it carries no graph.
    #[instrument(skip(self))]
    pub async fn diagram(
        &self,
        filename: &str,
        scheme: DiagramIdScheme,
    ) -> Result<String, DomainError> {
        let workflow = self.workflow(filename).await?;
        let raw = workflow
            .raw_workflow()
            .ok_or_else(|| DomainError::not_found("Workflow not found"))?;

        Ok(render_with(
            Some(raw.nodes.as_slice()),
            raw.connections.as_ref(),
            scheme,
        ))
    }

    /// Original bytes of a workflow document
    #[instrument(skip(self))]
    pub async fn download(&self, filename: &str) -> Result<Vec<u8>, DomainError> {
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| DomainError::not_found("Workflow file not found"))?;

        loader
            .read_document(filename)
            .await?
            .ok_or_else(|| DomainError::not_found("Workflow file not found"))
    }

    /// Categorize the first `category_scan_limit` workflows of the catalog
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<CategorizedWorkflows, DomainError> {
        let workflows = self.scan().await?;
        Ok(categorize(&workflows))
    }

    /// Sorted, deduplicated integrations across the scanned workflows
    #[instrument(skip(self))]
    pub async fn integrations(&self) -> Result<BTreeSet<String>, DomainError> {
        let workflows = self.scan().await?;
        Ok(distinct_integrations(&workflows))
    }

    pub async fn stats(&self) -> Result<CatalogStats, DomainError> {
        self.store.get_stats().await
    }

    async fn scan(&self) -> Result<Vec<WorkflowSummary>, DomainError> {
        let page = self
            .store
            .search_workflows(&SearchFilter::everything(), self.config.category_scan_limit, 0)
            .await?;

        if page.total > page.workflows.len() {
            debug!(
                total = page.total,
                scanned = page.workflows.len(),
                "Catalog larger than scan limit, listing is partial"
            );
        }

        Ok(page.workflows)
    }
}
