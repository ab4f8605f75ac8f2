//! File-backed checkpoint store over `~/.chronicle/config.yaml`.
//!
//! Lifecycle mirrors the pipeline's contract: load once, mutate in memory,
//! atomic save on `persist()`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use chronicle_core::{config, Config};
use chronicle_sync::{CheckpointStore, StoreError};

pub struct FileCheckpoint {
    home: PathBuf,
    config: Config,
}

impl FileCheckpoint {
    /// Wrap an already-loaded config. The caller keeps reading its other
    /// fields; this adapter owns only the checkpoint lifecycle.
    pub fn new(home: PathBuf, config: Config) -> Self {
        Self { home, config }
    }
}

impl CheckpointStore for FileCheckpoint {
    fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.config.last_sync_time
    }

    fn set_last_sync_time(&mut self, at: DateTime<Utc>) {
        self.config.last_sync_time = Some(at);
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        config::save_at(&self.home, &self.config)?;
        Ok(())
    }
}
