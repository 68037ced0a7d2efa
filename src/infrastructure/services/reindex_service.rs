//! Reindex service - single-flight background reindexing with status reporting

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::domain::{DomainError, IndexOutcome, WorkflowStore};
use crate::infrastructure::observability::{record_reindex_finished, record_reindex_started};

/// Latest known state of the reindex job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReindexStatus {
    Idle,
    Running {
        started_at: DateTime<Utc>,
        force: bool,
    },
    Completed {
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        force: bool,
        outcome: IndexOutcome,
    },
    Failed {
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        force: bool,
        error: String,
    },
}

/// Error text published in place of the store's message outside diagnostics mode
pub const REINDEX_FAILED: &str = "reindex failed";

impl ReindexStatus {
    /// Same status with the failure message replaced by a generic one
    pub fn redacted(self) -> Self {
        match self {
            Self::Failed {
                started_at,
                finished_at,
                force,
                ..
            } => Self::Failed {
                started_at,
                finished_at,
                force,
                error: REINDEX_FAILED.to_string(),
            },
            other => other,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

/// Result of asking for a reindex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReindexTrigger {
    /// A new run was spawned
    Started,
    /// A run was already in progress; nothing was started
    AlreadyRunning,
}

/// Exclusive claim on the reindex job.
///
/// Dropping it publishes the final status, which is also what releases the
/// claim. A run dropped before finishing (panic, cancelled future) is
/// published as failed.
struct RunClaim {
    status: Arc<watch::Sender<ReindexStatus>>,
    started_at: DateTime<Utc>,
    force: bool,
    finished: Option<ReindexStatus>,
}

impl RunClaim {
    fn finish(mut self, status: ReindexStatus) {
        self.finished = Some(status);
    }
}

impl Drop for RunClaim {
    fn drop(&mut self) {
        let finished = self.finished.take().unwrap_or_else(|| ReindexStatus::Failed {
            started_at: self.started_at,
            finished_at: Utc::now(),
            force: self.force,
            error: "Indexing was interrupted".to_string(),
        });
        self.status.send_replace(finished);
    }
}

/// Runs `WorkflowStore::index_workflows` at most once at a time.
///
/// The published status doubles as the in-flight flag: a run is claimed by
/// moving the status to `Running` and released by publishing its outcome,
/// both under the channel's lock.
pub struct ReindexService {
    store: Arc<dyn WorkflowStore>,
    status: Arc<watch::Sender<ReindexStatus>>,
}

impl std::fmt::Debug for ReindexService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReindexService")
            .field("status", &*self.status.borrow())
            .finish()
    }
}

impl ReindexService {
    pub fn new(store: Arc<dyn WorkflowStore>) -> Self {
        let (status, _) = watch::channel(ReindexStatus::Idle);

        Self {
            store,
            status: Arc::new(status),
        }
    }

    /// Latest published status
    pub fn status(&self) -> ReindexStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReindexStatus> {
        self.status.subscribe()
    }

    fn claim(&self, force: bool) -> Option<RunClaim> {
        let started_at = Utc::now();
        let claimed = self.status.send_if_modified(|current| {
            if current.is_running() {
                return false;
            }
            *current = ReindexStatus::Running { started_at, force };
            true
        });

        claimed.then(|| RunClaim {
            status: self.status.clone(),
            started_at,
            force,
            finished: None,
        })
    }

    /// Start a background reindex unless one is already running.
    ///
    /// Returns immediately. Failures of the run are logged and published in
    /// the status only.
    pub fn trigger(&self, force: bool) -> ReindexTrigger {
        let Some(claim) = self.claim(force) else {
            info!(force, "Reindex requested while a run is in progress");
            return ReindexTrigger::AlreadyRunning;
        };

        let store = self.store.clone();
        tokio::spawn(async move {
            let finished = execute(store.as_ref(), force, claim.started_at).await;
            claim.finish(finished);
        });

        ReindexTrigger::Started
    }

    /// Run a reindex on the current task and wait for it.
    ///
    /// Fails with `Conflict` when a background run is in progress.
    pub async fn run(&self, force: bool) -> Result<IndexOutcome, DomainError> {
        let claim = self
            .claim(force)
            .ok_or_else(|| DomainError::conflict("Indexing already in progress"))?;

        let finished = execute(self.store.as_ref(), force, claim.started_at).await;
        claim.finish(finished.clone());

        match finished {
            ReindexStatus::Completed { outcome, .. } => Ok(outcome),
            ReindexStatus::Failed { error, .. } => Err(DomainError::storage(error)),
            _ => Err(DomainError::internal("Reindex finished in an unexpected state")),
        }
    }
}

async fn execute(
    store: &dyn WorkflowStore,
    force: bool,
    started_at: DateTime<Utc>,
) -> ReindexStatus {
    record_reindex_started(force);
    info!(force, "Indexing started");
    let timer = Instant::now();

    let result = store.index_workflows(force).await;
    let elapsed = timer.elapsed();
    let finished_at = Utc::now();

    match result {
        Ok(outcome) => {
            record_reindex_finished(Some(&outcome), elapsed);
            info!(
                processed = outcome.processed,
                skipped = outcome.skipped,
                errors = outcome.errors,
                duration_ms = elapsed.as_millis() as u64,
                "Indexing completed"
            );
            if outcome.errors > 0 {
                warn!(errors = outcome.errors, "Some workflow files could not be indexed");
            }

            ReindexStatus::Completed {
                started_at,
                finished_at,
                force,
                outcome,
            }
        }
        Err(e) => {
            record_reindex_finished(None, elapsed);
            error!(error = %e, "Indexing failed");

            ReindexStatus::Failed {
                started_at,
                finished_at,
                force,
                error: e.to_string(),
            }
        }
    }
}
