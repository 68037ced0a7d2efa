//! Workflow catalog infrastructure implementations

mod in_memory_store;
mod loader;

pub use in_memory_store::InMemoryWorkflowStore;
pub use loader::{DirectoryScan, LoadError, SourceDocument, WorkflowLoader, parse_document};
