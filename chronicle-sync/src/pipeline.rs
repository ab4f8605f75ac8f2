//! Checkpointed sync pipeline.
//!
//! One run walks `Fetching → Processing → Finalizing`:
//!
//! 1. Fetch every `.md` document modified at or after the checkpoint, name
//!    order, content eagerly loaded. A listing failure aborts the run.
//! 2. Reconcile each document in order. Failures are scoped to the one
//!    document; the cancellation flag is polled once before each item.
//! 3. Tally, render the summary, and advance the checkpoint — only when the
//!    run recorded zero failures and was not cancelled.
//!
//! All collaborators are traits so tests can substitute in-memory doubles.

use chrono::{DateTime, Utc};

use chronicle_core::types::{Document, DocumentId, FolderId};

use crate::decision::{decide, Decision, RewriteReason};
use crate::error::{StoreError, SyncError};
use crate::rewrite::{rewrite, Rewritten};

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Listing order for [`DocumentStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Name,
}

/// Parameters for one listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub folder_id: FolderId,
    pub extensions: Vec<String>,
    pub modified_since: Option<DateTime<Utc>>,
    pub order: SortOrder,
    pub recursive: bool,
    pub with_content: bool,
}

/// The remote document store. Failures are opaque; the pipeline never
/// interprets status codes and never retries.
pub trait DocumentStore {
    fn list(&self, query: &ListQuery) -> Result<Vec<Document>, StoreError>;
    fn update(&self, id: &DocumentId, content: &str) -> Result<(), StoreError>;
}

/// The persisted sync checkpoint. Read once at run start, written and
/// persisted at most once at run end.
pub trait CheckpointStore {
    fn last_sync_time(&self) -> Option<DateTime<Utc>>;
    fn set_last_sync_time(&mut self, at: DateTime<Utc>);
    fn persist(&mut self) -> Result<(), StoreError>;
}

/// Progress sink and cooperative cancellation source.
pub trait Presenter {
    /// One event per visited document, in processing order.
    fn on_item(&mut self, outcome: &ItemOutcome);
    /// Polled once before each document; `true` stops the loop.
    fn is_cancelled(&self) -> bool;
    /// Rendered once per run, after processing and before checkpoint save.
    fn on_summary(&mut self, summary: &SyncSummary);
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Per-document result. Closed set — every consumer matches all three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// The corrected content was uploaded.
    Updated { reason: RewriteReason },
    /// Already compliant, or the rewrite was byte-identical.
    NoChange,
    /// Parse or upload failure; the run continued without this document.
    Failed { error: String },
}

/// Outcome of reconciling one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub name: String,
    pub id: DocumentId,
    pub status: ItemStatus,
}

/// Tally of one run, as handed to [`Presenter::on_summary`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncSummary {
    /// Documents visited this run (fetched minus skipped-by-cancellation).
    pub scanned: usize,
    pub no_change_count: usize,
    pub updated: Vec<(String, DocumentId)>,
    pub failed: Vec<(String, DocumentId)>,
    pub cancelled: bool,
}

impl SyncSummary {
    fn tally(outcomes: &[ItemOutcome], cancelled: bool) -> Self {
        let mut summary = SyncSummary {
            scanned: outcomes.len(),
            cancelled,
            ..SyncSummary::default()
        };
        for outcome in outcomes {
            match &outcome.status {
                ItemStatus::Updated { .. } => summary
                    .updated
                    .push((outcome.name.clone(), outcome.id.clone())),
                ItemStatus::NoChange => summary.no_change_count += 1,
                ItemStatus::Failed { .. } => summary
                    .failed
                    .push((outcome.name.clone(), outcome.id.clone())),
            }
        }
        summary
    }

    pub fn updated_count(&self) -> usize {
        self.updated.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// True when the fetch matched nothing at all.
    pub fn no_files(&self) -> bool {
        self.scanned == 0 && !self.cancelled
    }
}

/// What [`run`] hands back to the caller.
#[derive(Debug)]
pub struct SyncReport {
    pub outcomes: Vec<ItemOutcome>,
    pub cancelled: bool,
    pub checkpoint_advanced: bool,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Reconcile every journal entry modified since the stored checkpoint.
///
/// This is the canonical sync entrypoint; `chronicle sync` is a thin wrapper
/// around it. A missing folder id fails before any network access. The
/// checkpoint advances only after a clean, uncancelled pass, so failed or
/// skipped documents are re-fetched on the next run.
pub fn run(
    store: &impl DocumentStore,
    checkpoint: &mut impl CheckpointStore,
    presenter: &mut impl Presenter,
    folder_id: Option<&FolderId>,
) -> Result<SyncReport, SyncError> {
    let folder = folder_id
        .filter(|f| !f.0.is_empty())
        .ok_or(SyncError::MissingFolder)?;

    // Fetching.
    let since = checkpoint.last_sync_time();
    tracing::debug!("listing folder {folder} (modified since {since:?})");
    let query = ListQuery {
        folder_id: folder.clone(),
        extensions: vec!["md".to_string()],
        modified_since: since,
        order: SortOrder::Name,
        recursive: true,
        with_content: true,
    };
    let documents = store
        .list(&query)
        .map_err(|source| SyncError::Fetch { source })?;

    if documents.is_empty() {
        tracing::info!("no files to reconcile");
        presenter.on_summary(&SyncSummary::default());
        return Ok(SyncReport {
            outcomes: vec![],
            cancelled: false,
            checkpoint_advanced: false,
        });
    }

    // Processing.
    let mut outcomes = Vec::with_capacity(documents.len());
    let mut cancelled = false;
    for doc in &documents {
        if presenter.is_cancelled() {
            tracing::info!("cancelled after {} of {} documents", outcomes.len(), documents.len());
            cancelled = true;
            break;
        }
        let status = reconcile_document(store, doc);
        let outcome = ItemOutcome {
            name: doc.name.clone(),
            id: doc.id.clone(),
            status,
        };
        presenter.on_item(&outcome);
        outcomes.push(outcome);
    }

    // Finalizing.
    let summary = SyncSummary::tally(&outcomes, cancelled);
    presenter.on_summary(&summary);

    let mut checkpoint_advanced = false;
    if !cancelled && summary.failed.is_empty() {
        let completed_at = Utc::now();
        checkpoint.set_last_sync_time(completed_at);
        checkpoint
            .persist()
            .map_err(|source| SyncError::Persist { source })?;
        checkpoint_advanced = true;
        tracing::info!("checkpoint advanced to {completed_at}");
    } else {
        tracing::info!(
            "checkpoint left untouched ({} failed, cancelled: {cancelled})",
            summary.failed.len()
        );
    }

    Ok(SyncReport {
        outcomes,
        cancelled,
        checkpoint_advanced,
    })
}

fn reconcile_document(store: &impl DocumentStore, doc: &Document) -> ItemStatus {
    let decision = match decide(&doc.content) {
        Ok(d) => d,
        Err(e) => {
            return ItemStatus::Failed {
                error: e.to_string(),
            }
        }
    };
    let reason = match decision {
        Decision::UpToDate => return ItemStatus::NoChange,
        Decision::Rewrite { reason } => reason,
    };
    match rewrite(doc) {
        Err(e) => ItemStatus::Failed {
            error: e.to_string(),
        },
        Ok(Rewritten::Unchanged) => ItemStatus::NoChange,
        Ok(Rewritten::Changed(next)) => match store.update(&doc.id, &next) {
            Ok(()) => {
                tracing::debug!("updated {} ({reason})", doc.name);
                ItemStatus::Updated { reason }
            }
            Err(e) => ItemStatus::Failed {
                error: format!("remote update failed: {e}"),
            },
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
