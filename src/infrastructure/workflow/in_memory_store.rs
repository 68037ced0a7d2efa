//! In-memory workflow store backed by a directory of workflow exports

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::workflow::ALL;
use crate::domain::{
    CatalogStats, DomainError, IndexOutcome, SearchFilter, SearchPage, Workflow, WorkflowStore,
    WorkflowSummary,
};
use super::loader::{WorkflowLoader, parse_document};

#[derive(Debug, Default)]
struct CatalogSnapshot {
    workflows: BTreeMap<String, Workflow>,
    last_indexed: Option<DateTime<Utc>>,
}

/// In-memory implementation of WorkflowStore.
///
/// Indexing replaces the whole snapshot at once, so readers never observe a
/// half-built catalog.
#[derive(Debug)]
pub struct InMemoryWorkflowStore {
    loader: Option<WorkflowLoader>,
    snapshot: Arc<RwLock<CatalogSnapshot>>,
}

impl InMemoryWorkflowStore {
    /// Create an empty store that indexes from `loader`
    pub fn new(loader: WorkflowLoader) -> Self {
        Self {
            loader: Some(loader),
            snapshot: Arc::new(RwLock::new(CatalogSnapshot::default())),
        }
    }

    /// Create a store pre-populated with workflows and no backing directory
    pub fn with_workflows(workflows: Vec<Workflow>) -> Self {
        let workflows = workflows
            .into_iter()
            .map(|w| (w.filename().to_string(), w))
            .collect();

        Self {
            loader: None,
            snapshot: Arc::new(RwLock::new(CatalogSnapshot {
                workflows,
                last_indexed: None,
            })),
        }
    }

    pub fn loader(&self) -> Option<&WorkflowLoader> {
        self.loader.as_ref()
    }
}

fn matches_filter(summary: &WorkflowSummary, filter: &SearchFilter, query_lower: &str) -> bool {
    if filter.active_only && !summary.active {
        return false;
    }
    if filter.trigger != ALL && summary.trigger != filter.trigger {
        return false;
    }
    if filter.complexity != ALL && summary.complexity != filter.complexity {
        return false;
    }
    if query_lower.is_empty() {
        return true;
    }

    summary.name.to_lowercase().contains(query_lower)
        || summary.description.to_lowercase().contains(query_lower)
        || summary.filename.to_lowercase().contains(query_lower)
        || summary
            .integrations
            .iter()
            .any(|integration| integration.to_lowercase().contains(query_lower))
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn initialize(&self) -> Result<(), DomainError> {
        let is_empty = self.snapshot.read().await.workflows.is_empty();

        if is_empty && self.loader.is_some() {
            let outcome = self.index_workflows(false).await?;
            info!(
                processed = outcome.processed,
                errors = outcome.errors,
                "Initial workflow index built"
            );
        }

        Ok(())
    }

    async fn close(&self) -> Result<(), DomainError> {
        let mut snapshot = self.snapshot.write().await;
        snapshot.workflows.clear();
        snapshot.last_indexed = None;
        Ok(())
    }

    async fn get_stats(&self) -> Result<CatalogStats, DomainError> {
        let snapshot = self.snapshot.read().await;
        let mut stats = CatalogStats {
            last_indexed: snapshot.last_indexed,
            ..Default::default()
        };
        let mut integrations = HashSet::new();

        for workflow in snapshot.workflows.values() {
            let summary = workflow.summary();
            stats.total += 1;
            if summary.active {
                stats.active += 1;
            }
            *stats.triggers.entry(summary.trigger.clone()).or_default() += 1;
            *stats.complexity.entry(summary.complexity.clone()).or_default() += 1;
            stats.total_nodes += summary.node_count;
            integrations.extend(summary.integrations.iter().map(String::as_str));
        }

        stats.inactive = stats.total - stats.active;
        stats.unique_integrations = integrations.len();

        Ok(stats)
    }

    async fn search_workflows(
        &self,
        filter: &SearchFilter,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, DomainError> {
        let snapshot = self.snapshot.read().await;
        let query_lower = filter.query.trim().to_lowercase();

        let mut matched: Vec<&WorkflowSummary> = snapshot
            .workflows
            .values()
            .map(Workflow::summary)
            .filter(|summary| matches_filter(summary, filter, &query_lower))
            .collect();

        matched.sort_by(|a, b| b.active.cmp(&a.active).then_with(|| a.name.cmp(&b.name)));

        let total = matched.len();
        let workflows = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(SearchPage { workflows, total })
    }

    async fn get_workflow_detail(&self, filename: &str) -> Result<Option<Workflow>, DomainError> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot.workflows.get(filename).cloned())
    }

    async fn index_workflows(&self, force: bool) -> Result<IndexOutcome, DomainError> {
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| DomainError::validation("No workflow directory configured"))?;

        let scan = loader.scan().await?;
        let mut outcome = IndexOutcome {
            errors: scan.unreadable,
            ..Default::default()
        };

        // Build off to the side so searches keep reading the previous catalog.
        let previous: BTreeMap<String, String> = {
            let snapshot = self.snapshot.read().await;
            snapshot
                .workflows
                .iter()
                .map(|(filename, w)| (filename.clone(), w.summary().file_hash.clone()))
                .collect()
        };
        let mut reused = Vec::new();
        let mut rebuilt = BTreeMap::new();

        for document in &scan.documents {
            if !force && previous.get(&document.filename) == Some(&document.hash()) {
                reused.push(document.filename.clone());
                outcome.skipped += 1;
                continue;
            }

            match parse_document(document) {
                Ok(workflow) => {
                    rebuilt.insert(document.filename.clone(), workflow);
                    outcome.processed += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Skipping unparseable workflow");
                    outcome.errors += 1;
                }
            }
        }

        let mut snapshot = self.snapshot.write().await;
        for filename in reused {
            if let Some(workflow) = snapshot.workflows.remove(&filename) {
                rebuilt.insert(filename, workflow);
            }
        }
        snapshot.workflows = rebuilt;
        snapshot.last_indexed = Some(Utc::now());

        info!(
            dir = %loader.dir().display(),
            processed = outcome.processed,
            skipped = outcome.skipped,
            errors = outcome.errors,
            total = snapshot.workflows.len(),
            force,
            "Workflow index rebuilt"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::workflow::{Node, RawWorkflow};
    use super::*;

    fn summary(filename: &str, name: &str) -> WorkflowSummary {
        WorkflowSummary::new(filename, name)
    }

    fn catalog() -> InMemoryWorkflowStore {
        InMemoryWorkflowStore::with_workflows(vec![
            Workflow::new(
                summary("slack.json", "Slack Alerts")
                    .with_active(true)
                    .with_trigger("Webhook")
                    .with_complexity("low")
                    .with_integrations(["Slack", "Webhook"]),
            ),
            Workflow::new(
                summary("sheets.json", "Sheets Sync")
                    .with_trigger("Scheduled")
                    .with_complexity("medium")
                    .with_description("Copies rows nightly")
                    .with_integrations(["GoogleSheets"]),
            ),
            Workflow::new(
                summary("github.json", "Issue Triage")
                    .with_active(true)
                    .with_trigger("Triggered")
                    .with_complexity("high")
                    .with_integrations(["GitHub", "Slack"]),
            )
            .with_raw_workflow(RawWorkflow::new(vec![Node::new("On Issue", "x.githubTrigger")], None)),
        ])
    }

    fn filenames(page: &SearchPage) -> Vec<&str> {
        page.workflows.iter().map(|w| w.filename.as_str()).collect()
    }

    #[tokio::test]
    async fn test_search_everything_active_first_then_name() {
        let store = catalog();
        let page = store
            .search_workflows(&SearchFilter::everything(), 100, 0)
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(filenames(&page), vec!["github.json", "slack.json", "sheets.json"]);
    }

    #[tokio::test]
    async fn test_search_query_matches_name_description_integrations() {
        let store = catalog();
        let search = |query: &str| {
            let filter = SearchFilter {
                query: query.to_string(),
                ..SearchFilter::everything()
            };
            let store = &store;
            async move { store.search_workflows(&filter, 100, 0).await.unwrap() }
        };

        assert_eq!(filenames(&search("ALERTS").await), vec!["slack.json"]);
        assert_eq!(filenames(&search("nightly").await), vec!["sheets.json"]);
        assert_eq!(filenames(&search("slack").await), vec!["github.json", "slack.json"]);
        assert_eq!(search("nothing-like-this").await.total, 0);
    }

    #[tokio::test]
    async fn test_search_filters() {
        let store = catalog();

        let filter = SearchFilter {
            trigger: "Scheduled".to_string(),
            ..SearchFilter::everything()
        };
        let page = store.search_workflows(&filter, 100, 0).await.unwrap();
        assert_eq!(filenames(&page), vec!["sheets.json"]);

        let filter = SearchFilter {
            complexity: "high".to_string(),
            ..SearchFilter::everything()
        };
        let page = store.search_workflows(&filter, 100, 0).await.unwrap();
        assert_eq!(filenames(&page), vec!["github.json"]);

        let filter = SearchFilter {
            active_only: true,
            ..SearchFilter::everything()
        };
        let page = store.search_workflows(&filter, 100, 0).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_search_counts_before_slicing() {
        let store = catalog();
        let page = store
            .search_workflows(&SearchFilter::everything(), 1, 1)
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(filenames(&page), vec!["slack.json"]);

        let beyond = store
            .search_workflows(&SearchFilter::everything(), 10, 50)
            .await
            .unwrap();
        assert_eq!(beyond.total, 3);
        assert!(beyond.workflows.is_empty());
    }

    #[tokio::test]
    async fn test_detail_and_missing() {
        let store = catalog();

        let detail = store.get_workflow_detail("github.json").await.unwrap().unwrap();
        assert_eq!(detail.raw_workflow().unwrap().nodes.len(), 1);
        assert!(store.get_workflow_detail("nope.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats() {
        let store = catalog();
        let stats = store.get_stats().await.unwrap();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.inactive, 1);
        assert_eq!(stats.triggers.get("Webhook"), Some(&1));
        assert_eq!(stats.complexity.get("medium"), Some(&1));
        assert_eq!(stats.unique_integrations, 4);
        assert!(stats.last_indexed.is_none());
    }

    #[tokio::test]
    async fn test_index_without_directory_fails() {
        let store = catalog();
        let err = store.index_workflows(true).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_index_skips_unchanged_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| std::fs::write(dir.path().join(name), body).unwrap();
        write(
            "a.json",
            r#"{"name": "A", "nodes": [{"name": "Hook", "type": "n8n-nodes-base.webhook"}]}"#,
        );
        write("b.json", r#"{"name": "B", "nodes": []}"#);
        write("broken.json", "{");

        let store = InMemoryWorkflowStore::new(WorkflowLoader::new(dir.path()));

        let first = store.index_workflows(false).await.unwrap();
        assert_eq!(first, IndexOutcome { processed: 2, skipped: 0, errors: 1 });

        write("b.json", r#"{"name": "B2", "nodes": []}"#);
        let second = store.index_workflows(false).await.unwrap();
        assert_eq!(second, IndexOutcome { processed: 1, skipped: 1, errors: 1 });

        let b = store.get_workflow_detail("b.json").await.unwrap().unwrap();
        assert_eq!(b.summary().name, "B2");

        let forced = store.index_workflows(true).await.unwrap();
        assert_eq!(forced, IndexOutcome { processed: 2, skipped: 0, errors: 1 });

        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert!(stats.last_indexed.is_some());
    }

    #[tokio::test]
    async fn test_index_drops_removed_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"nodes": []}"#).unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{"nodes": [{"name": "x"}]}"#).unwrap();

        let store = InMemoryWorkflowStore::new(WorkflowLoader::new(dir.path()));
        store.initialize().await.unwrap();
        assert_eq!(store.get_stats().await.unwrap().total, 2);

        std::fs::remove_file(dir.path().join("b.json")).unwrap();
        store.index_workflows(false).await.unwrap();

        assert!(store.get_workflow_detail("b.json").await.unwrap().is_none());
        assert!(store.get_workflow_detail("a.json").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_close_clears_catalog() {
        let store = catalog();
        store.close().await.unwrap();
        assert_eq!(store.get_stats().await.unwrap().total, 0);
    }
}
