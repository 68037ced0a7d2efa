//! Domain layer - Core catalog logic and entities

pub mod error;
pub mod workflow;

pub use error::DomainError;
pub use workflow::{
    CatalogStats, CategorizedWorkflows, Connections, DiagramIdScheme, IndexOutcome, Node,
    QueryEngine, RawWorkflow, SearchFilter, SearchPage, SearchParams, SearchQuery, SearchResult,
    Workflow, WorkflowStore, WorkflowSummary,
};
