//! Application state for shared services

use std::sync::Arc;

use crate::domain::DomainError;
use crate::infrastructure::services::{CatalogService, ReindexService};

use super::types::ApiError;

/// Application state shared by every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub reindex: Arc<ReindexService>,
    /// Expose error details in 5xx bodies
    pub diagnostics: bool,
}

impl AppState {
    pub fn new(catalog: Arc<CatalogService>, reindex: Arc<ReindexService>) -> Self {
        Self {
            catalog,
            reindex,
            diagnostics: false,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Error mapper for handlers: `.map_err(state.fail("Error fetching stats"))`
    pub fn fail(&self, context: &'static str) -> impl FnOnce(DomainError) -> ApiError + use<> {
        let diagnostics = self.diagnostics;
        move |err| ApiError::from_domain(err, context, diagnostics)
    }
}
