//! Search parameter normalization and result envelope shaping
//!
//! Incoming parameters are untyped strings. They are never rejected: each one
//! is coerced to the nearest valid value.
//!
//! | Parameter     | Missing / malformed | Coercion                          |
//! |---------------|---------------------|-----------------------------------|
//! | `q`           | `""`                | passed through                    |
//! | `trigger`     | `"all"`             | passed through                    |
//! | `complexity`  | `"all"`             | passed through                    |
//! | `active_only` | `false`             | `true` only for the literal "true"|
//! | `page`        | `1`                 | raised to at least 1              |
//! | `per_page`    | `20`                | clamped to `1..=100`              |
//!
//! Numbers are read from their leading integer prefix, so `"3rd"` is 3.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::DomainError;
use super::entity::{ALL, WorkflowSummary};
use super::store::{SearchFilter, WorkflowStore};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 20;
pub const MIN_PER_PAGE: usize = 1;
pub const MAX_PER_PAGE: usize = 100;

/// Raw search parameters as they arrive from the boundary layer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub trigger: Option<String>,
    pub complexity: Option<String>,
    pub active_only: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Normalized search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub filter: SearchFilter,
    pub page: usize,
    pub per_page: usize,
}

impl SearchQuery {
    /// Zero-based index of the first result in the window
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl From<SearchParams> for SearchQuery {
    fn from(params: SearchParams) -> Self {
        let page = params
            .page
            .as_deref()
            .and_then(parse_leading_int)
            .map_or(DEFAULT_PAGE, |n| clamp_to_usize(n).max(1));

        let per_page = params
            .per_page
            .as_deref()
            .and_then(parse_leading_int)
            .map_or(DEFAULT_PER_PAGE, |n| {
                clamp_to_usize(n).clamp(MIN_PER_PAGE, MAX_PER_PAGE)
            });

        Self {
            filter: SearchFilter {
                query: params.q.unwrap_or_default(),
                trigger: params.trigger.unwrap_or_else(|| ALL.to_string()),
                complexity: params.complexity.unwrap_or_else(|| ALL.to_string()),
                active_only: params.active_only.as_deref() == Some("true"),
            },
            page,
            per_page,
        }
    }
}

/// Read the leading integer of a string, ignoring leading whitespace.
///
/// Returns `None` when no digit follows the optional sign. Values beyond the
/// `i64` range saturate.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn clamp_to_usize(n: i64) -> usize {
    usize::try_from(n).unwrap_or(if n < 0 { 0 } else { usize::MAX })
}

/// Number of pages needed for `total` results; zero when there are none
pub fn page_count(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1))
}

/// Filters echoed back in the result envelope
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppliedFilters {
    pub trigger: String,
    pub complexity: String,
    pub active_only: bool,
}

/// Search result envelope
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    pub workflows: Vec<WorkflowSummary>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub pages: usize,
    pub query: String,
    pub filters: AppliedFilters,
}

/// Normalizes searches, delegates filtering to the store and shapes the envelope
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn WorkflowStore>,
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine").finish()
    }
}

impl QueryEngine {
    pub fn new(store: Arc<dyn WorkflowStore>) -> Self {
        Self { store }
    }

    /// Run a search; store failures are returned unchanged
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResult, DomainError> {
        let offset = query.offset();

        debug!(
            query = %query.filter.query,
            trigger = %query.filter.trigger,
            complexity = %query.filter.complexity,
            active_only = query.filter.active_only,
            page = query.page,
            per_page = query.per_page,
            offset,
            "Searching workflows"
        );

        let result = self
            .store
            .search_workflows(&query.filter, query.per_page, offset)
            .await?;

        Ok(SearchResult {
            workflows: result.workflows,
            total: result.total,
            page: query.page,
            per_page: query.per_page,
            pages: page_count(result.total, query.per_page),
            query: query.filter.query,
            filters: AppliedFilters {
                trigger: query.filter.trigger,
                complexity: query.filter.complexity,
                active_only: query.filter.active_only,
            },
        })
    }
}
