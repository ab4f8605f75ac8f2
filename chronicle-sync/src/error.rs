//! Error types for chronicle-sync.

use thiserror::Error;

/// Opaque failure from a collaborator (document store, checkpoint store).
///
/// The engine never interprets these — no status-code inspection, no retries.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from decoding or re-encoding a front-matter block.
///
/// Scoped to one document: the pipeline records the document as failed and
/// moves on.
#[derive(Debug, Error)]
pub enum FrontMatterError {
    /// The delimited block is not a valid YAML mapping.
    #[error("malformed front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `created`/`updated` value is a scalar but not a recognized timestamp.
    #[error("front-matter field `{key}` is not a valid timestamp: {value:?}")]
    Timestamp { key: &'static str, value: String },

    /// A `created`/`updated` value is not a scalar at all (mapping, list, …).
    #[error("front-matter field `{key}` must be a timestamp string")]
    NotATimestampString { key: &'static str },
}

/// Fatal errors for a whole sync run.
///
/// Per-document failures are *not* represented here; they live in
/// [`crate::pipeline::ItemStatus::Failed`] and never abort the run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No journal folder configured — refused before any network access.
    #[error("no journal folder configured; run `chronicle config set-folder <id>` first")]
    MissingFolder,

    /// Listing the remote folder failed; nothing was processed.
    #[error("failed to list journal folder: {source}")]
    Fetch {
        #[source]
        source: StoreError,
    },

    /// Persisting the checkpoint failed after processing completed.
    ///
    /// Results for processed documents stand, but the checkpoint did not
    /// advance and the next run will re-fetch them.
    #[error("failed to persist sync checkpoint: {source}")]
    Persist {
        #[source]
        source: StoreError,
    },
}
