//! Front-matter codec.
//!
//! A journal entry looks like:
//!
//! ```text
//! ---
//! created: 2024-01-15T09:30:00+09:00
//! updated: now
//! tags: [work, travel]
//! ---
//! # body …
//! ```
//!
//! The block between the `---` delimiters decodes into an insertion-ordered
//! [`serde_yaml::Mapping`]; that mapping is the single source of truth for
//! round-tripping, so keys this crate does not recognize survive every
//! rewrite. An opening delimiter with no matching closer is treated as "no
//! block" — the whole content is body and no rewrite touches it.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use serde_yaml::{Mapping, Value};

use crate::error::FrontMatterError;

const DELIMITER: &str = "---";

/// Parsed representation of a front-matter block.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    /// Parsed `created` timestamp; `None` when the key is absent.
    pub created: Option<DateTime<FixedOffset>>,
    /// True when `updated` holds the literal placeholder token `now`.
    pub has_updated_placeholder: bool,
    /// Every key in the block, in document order, values as parsed.
    pub fields: Mapping,
}

// ---------------------------------------------------------------------------
// Block detection
// ---------------------------------------------------------------------------

/// Split content into `(block_text, body)` at the front-matter delimiters.
///
/// Returns `None` unless the first line is exactly `---` and a later line is
/// exactly `---`. The block text excludes both delimiter lines; the body is
/// everything after the closing delimiter's newline, byte-for-byte.
fn split_block(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((block, body));
        }
        offset += line.len();
    }
    None
}

/// True iff the content carries a properly delimited front-matter block.
pub fn has_block(content: &str) -> bool {
    split_block(content).is_some()
}

/// True iff a top-level `updated` key *inside the block* has the literal
/// value `now`, in any quoting style. Body text never matches.
pub fn has_now_placeholder(content: &str) -> bool {
    let Some((block, _)) = split_block(content) else {
        return false;
    };
    block.lines().any(|line| {
        // Top-level keys only; indented lines belong to nested values.
        if line.starts_with(char::is_whitespace) {
            return false;
        }
        match line.split_once(':') {
            Some((key, value)) => key == "updated" && is_now_token(value),
            None => false,
        }
    })
}

fn is_now_token(raw: &str) -> bool {
    let v = raw.trim();
    let unquoted = v
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| v.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(v);
    unquoted == "now"
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

/// Decode the front-matter block, if any.
///
/// - No block → `(None, content)` — untouched body.
/// - Empty block (`---\n---\n`) → `Some(FrontMatter)` with empty `fields`.
/// - Malformed YAML or an invalid `created`/`updated` value fails the whole
///   decode; no partial result.
pub fn parse(content: &str) -> Result<(Option<FrontMatter>, &str), FrontMatterError> {
    let Some((block, body)) = split_block(content) else {
        return Ok((None, content));
    };

    let fields: Mapping = if block.trim().is_empty() {
        Mapping::new()
    } else {
        serde_yaml::from_str(block)?
    };

    let created = match fields.get(&key("created")) {
        None => None,
        Some(v) => Some(timestamp_value("created", v)?),
    };
    let has_updated_placeholder = match fields.get(&key("updated")) {
        None => false,
        Some(v) if is_now_value(v) => true,
        Some(v) => {
            timestamp_value("updated", v)?;
            false
        }
    };

    Ok((
        Some(FrontMatter {
            created,
            has_updated_placeholder,
            fields,
        }),
        body,
    ))
}

fn key(name: &str) -> Value {
    Value::String(name.to_owned())
}

fn is_now_value(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.trim() == "now")
}

fn timestamp_value(
    field: &'static str,
    value: &Value,
) -> Result<DateTime<FixedOffset>, FrontMatterError> {
    let Value::String(raw) = value else {
        return Err(FrontMatterError::NotATimestampString { key: field });
    };
    parse_timestamp(raw).ok_or_else(|| FrontMatterError::Timestamp {
        key: field,
        value: raw.clone(),
    })
}

/// Accept RFC 3339 with offset, or a bare calendar date as midnight UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc).fixed_offset())
}

/// RFC 3339 with numeric offset, seconds precision, no `Z` shorthand.
pub fn format_timestamp(t: DateTime<FixedOffset>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, false)
}

// ---------------------------------------------------------------------------
// Generate / update
// ---------------------------------------------------------------------------

/// Minimal fresh block: a lone `created` field plus a blank separator line.
pub fn generate(created: DateTime<FixedOffset>) -> String {
    format!("---\ncreated: {}\n---\n\n", format_timestamp(created))
}

/// Rewrite the front-matter block in `content`.
///
/// - No block and `created` is `None` → content returned unchanged.
/// - No block and `created` is set → prepend [`generate`].
/// - Otherwise decode the block, insert `created` only if the key is absent,
///   and when `replace_now` is set overwrite `updated` — whatever its
///   original quoting — with an unquoted timestamp. Every other key is
///   re-serialized with its parsed value intact.
///
/// Decode errors propagate; there is no silent recovery.
pub fn update(
    content: &str,
    created: Option<DateTime<FixedOffset>>,
    updated: Option<DateTime<FixedOffset>>,
    replace_now: bool,
) -> Result<String, FrontMatterError> {
    if !has_block(content) {
        return Ok(match created {
            None => content.to_owned(),
            Some(t) => format!("{}{}", generate(t), content),
        });
    }

    let (parsed, body) = parse(content)?;
    // has_block above guarantees a block; parse returns it or errors.
    let mut fields = parsed.map(|fm| fm.fields).unwrap_or_default();

    if let Some(t) = created {
        if !fields.contains_key(&key("created")) {
            fields.insert(key("created"), Value::String(format_timestamp(t)));
        }
    }
    if replace_now {
        if let Some(t) = updated {
            fields.insert(key("updated"), Value::String(format_timestamp(t)));
        }
    }

    render(&fields, body)
}

fn render(fields: &Mapping, body: &str) -> Result<String, FrontMatterError> {
    if fields.is_empty() {
        return Ok(format!("---\n---\n{body}"));
    }
    let yaml = serde_yaml::to_string(fields)?;
    Ok(format!("---\n{yaml}---\n{body}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
