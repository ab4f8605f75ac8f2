//! Compliance classification for a single journal entry.
//!
//! Check precedence:
//! 1. No front-matter block at all
//! 2. Block present but unparsable (error — caller records a failure)
//! 3. `created` key absent
//! 4. `updated` holds the `now` placeholder
//!
//! Checks 3 and 4 are independent causes; the rewrite fixes everything it
//! finds, and the reported reason is simply the first check that fired.

use std::fmt;

use crate::error::FrontMatterError;
use crate::frontmatter;

/// Why a document needs its front-matter rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteReason {
    MissingBlock,
    MissingCreated,
    UpdatedPlaceholder,
}

impl fmt::Display for RewriteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteReason::MissingBlock => write!(f, "added front-matter"),
            RewriteReason::MissingCreated => write!(f, "added created field"),
            RewriteReason::UpdatedPlaceholder => write!(f, "replaced updated placeholder"),
        }
    }
}

/// Outcome of classifying one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Metadata already complies; nothing to upload.
    UpToDate,
    /// A rewrite is required.
    Rewrite { reason: RewriteReason },
}

/// Classify a document's content against the normalization policy.
///
/// A malformed block returns `Err`; the caller must treat that as a failed
/// document, never as "no change".
pub fn decide(content: &str) -> Result<Decision, FrontMatterError> {
    let (parsed, _body) = frontmatter::parse(content)?;
    let Some(fm) = parsed else {
        return Ok(Decision::Rewrite {
            reason: RewriteReason::MissingBlock,
        });
    };
    if fm.created.is_none() {
        return Ok(Decision::Rewrite {
            reason: RewriteReason::MissingCreated,
        });
    }
    if fm.has_updated_placeholder {
        return Ok(Decision::Rewrite {
            reason: RewriteReason::UpdatedPlaceholder,
        });
    }
    Ok(Decision::UpToDate)
}
