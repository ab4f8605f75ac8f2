//! Content rewriter — derives target timestamps from the remote store.
//!
//! Timestamps written into front-matter come only from the document's
//! authoritative remote timestamps, localized to the machine's UTC offset:
//! `created` from `remote_created_at`, `updated` from `remote_modified_at`
//! (the latter only when the `now` placeholder is present). Wall-clock time
//! is never substituted.

use chrono::Local;

use chronicle_core::types::Document;

use crate::error::FrontMatterError;
use crate::frontmatter;

/// Result of rewriting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewritten {
    /// The corrected bytes differ from the original — upload them.
    Changed(String),
    /// The rewrite produced byte-identical content.
    ///
    /// This is the idempotence guard: a document already in target form must
    /// downgrade to "no change", never cause a spurious upload.
    Unchanged,
}

/// Produce the corrected content for a document the decision step flagged.
pub fn rewrite(doc: &Document) -> Result<Rewritten, FrontMatterError> {
    let created = doc.remote_created_at.with_timezone(&Local).fixed_offset();
    let updated = doc.remote_modified_at.with_timezone(&Local).fixed_offset();
    let replace_now = frontmatter::has_now_placeholder(&doc.content);

    let next = frontmatter::update(&doc.content, Some(created), Some(updated), replace_now)?;
    if next == doc.content {
        return Ok(Rewritten::Unchanged);
    }
    Ok(Rewritten::Changed(next))
}
