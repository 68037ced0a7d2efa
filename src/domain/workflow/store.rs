//! Workflow store trait - persistence and indexing collaborator

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use super::entity::{ALL, Workflow, WorkflowSummary};

#[cfg(test)]
use mockall::automock;

/// Filter handed to the store; `"all"` disables the trigger/complexity filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub query: String,
    pub trigger: String,
    pub complexity: String,
    pub active_only: bool,
}

impl SearchFilter {
    /// Filter matching every workflow in the catalog
    pub fn everything() -> Self {
        Self {
            query: String::new(),
            trigger: ALL.to_string(),
            complexity: ALL.to_string(),
            active_only: false,
        }
    }
}

/// One window of search results plus the unsliced match count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub workflows: Vec<WorkflowSummary>,
    pub total: usize,
}

/// Aggregate catalog statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub triggers: BTreeMap<String, usize>,
    pub complexity: BTreeMap<String, usize>,
    pub total_nodes: usize,
    pub unique_integrations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_indexed: Option<DateTime<Utc>>,
}

/// Counts produced by one indexing run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexOutcome {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Store owning workflow persistence and indexing
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Prepare the store for use
    async fn initialize(&self) -> Result<(), DomainError>;

    /// Release held resources
    async fn close(&self) -> Result<(), DomainError>;

    async fn get_stats(&self) -> Result<CatalogStats, DomainError>;

    /// Filter, count and slice the catalog
    async fn search_workflows(
        &self,
        filter: &SearchFilter,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, DomainError>;

    /// Full record for a filename, graph included
    async fn get_workflow_detail(&self, filename: &str) -> Result<Option<Workflow>, DomainError>;

    /// Rebuild the index; `force` reprocesses unchanged documents too
    async fn index_workflows(&self, force: bool) -> Result<IndexOutcome, DomainError>;
}
