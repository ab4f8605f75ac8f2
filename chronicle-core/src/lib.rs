//! Chronicle core library — domain types, config persistence, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`error`] — [`ConfigError`]
//! - [`config`] — load / save / path helpers for `~/.chronicle/config.yaml`

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::ConfigError;
pub use types::{Document, DocumentId, FolderId};
