//! `chronicle sync` — reconcile remote journal entries.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use chronicle_core::{config, types::FolderId};

use crate::checkpoint::FileCheckpoint;
use crate::presenter::ConsolePresenter;
use crate::remote::RemoteStore;

/// Arguments for `chronicle sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Override the configured folder id for this run.
    #[arg(long)]
    pub folder: Option<String>,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config =
            config::load_at(&home).context("failed to load ~/.chronicle/config.yaml")?;

        let folder: Option<FolderId> = self
            .folder
            .map(FolderId::from)
            .or_else(|| config.folder_id.clone());
        let remote_url = config.remote_url.clone().context(
            "no remote endpoint configured; run `chronicle config set-remote <url>` first",
        )?;

        let store = RemoteStore::new(remote_url, config.api_token.clone());
        let mut checkpoint = FileCheckpoint::new(home, config);
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut presenter = ConsolePresenter::new(cancelled);

        let report =
            chronicle_sync::run(&store, &mut checkpoint, &mut presenter, folder.as_ref())
                .context("sync failed")?;

        if report.checkpoint_advanced {
            println!("✓ checkpoint advanced");
        }
        Ok(())
    }
}
