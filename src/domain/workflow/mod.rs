//! Workflow catalog domain module
//!
//! Catalog records, the store contract and the pure views computed over them:
//! - search normalization and result envelopes (`query`)
//! - integration categories (`category`)
//! - Mermaid diagrams of the node graph (`diagram`)
//! - metadata derived from a node graph during indexing (`classify`)

pub mod category;
pub mod classify;
pub mod diagram;
mod entity;
mod graph;
mod query;
pub mod store;

pub use category::{
    CATEGORY_TABLE, CategorizedWorkflows, OTHER_CATEGORY, categorize, distinct_integrations,
};
pub use diagram::{DiagramIdScheme, render, render_with, sanitize_node_id};
pub use entity::{ALL, Workflow, WorkflowSummary};
pub use graph::{ConnectionTarget, Connections, MAIN_OUTPUT, Node, NodeOutputs, RawWorkflow};
pub use query::{
    AppliedFilters, DEFAULT_PER_PAGE, MAX_PER_PAGE, MIN_PER_PAGE, QueryEngine, SearchParams,
    SearchQuery, SearchResult, page_count,
};
pub use store::{CatalogStats, IndexOutcome, SearchFilter, SearchPage, WorkflowStore};
