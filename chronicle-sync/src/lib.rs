//! # chronicle-sync
//!
//! Front-matter reconciliation engine and checkpointed sync pipeline.
//!
//! Call [`pipeline::run`] with a [`DocumentStore`], a [`CheckpointStore`] and
//! a [`Presenter`] to reconcile every journal entry modified since the stored
//! checkpoint.

pub mod decision;
pub mod error;
pub mod frontmatter;
pub mod pipeline;
pub mod rewrite;

pub use decision::{decide, Decision, RewriteReason};
pub use error::{FrontMatterError, StoreError, SyncError};
pub use pipeline::{
    run, CheckpointStore, DocumentStore, ItemOutcome, ItemStatus, ListQuery, Presenter,
    SortOrder, SyncReport, SyncSummary,
};
pub use rewrite::{rewrite, Rewritten};
