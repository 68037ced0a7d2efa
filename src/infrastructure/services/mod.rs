//! Infrastructure services

mod catalog_service;
mod reindex_service;

pub use catalog_service::{CatalogService, CatalogServiceConfig, DEFAULT_CATEGORY_SCAN_LIMIT};
pub use reindex_service::{REINDEX_FAILED, ReindexService, ReindexStatus, ReindexTrigger};
