//! `chronicle status` — configuration and checkpoint visibility.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use chronicle_core::config;

/// Arguments for `chronicle status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson {
    folder: Option<String>,
    remote: Option<String>,
    checkpoint: Option<String>,
    checkpoint_age: Option<String>,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config =
            config::load_at(&home).context("failed to load ~/.chronicle/config.yaml")?;

        if self.json {
            let status = StatusJson {
                folder: config.folder_id.map(|f| f.0),
                remote: config.remote_url,
                checkpoint: config.last_sync_time.map(|t| t.to_rfc3339()),
                checkpoint_age: config.last_sync_time.map(format_age),
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
            return Ok(());
        }

        match config.folder_id {
            Some(folder) => println!("folder:     {folder}"),
            None => println!(
                "folder:     {} (run `chronicle config set-folder <id>`)",
                "unset".yellow()
            ),
        }
        match config.remote_url {
            Some(url) => println!("remote:     {url}"),
            None => println!(
                "remote:     {} (run `chronicle config set-remote <url>`)",
                "unset".yellow()
            ),
        }
        match config.last_sync_time {
            Some(at) => println!("checkpoint: {} ({} ago)", at.to_rfc3339(), format_age(at)),
            None => println!("checkpoint: {} — next sync scans everything", "never".yellow()),
        }
        Ok(())
    }
}

/// Compact age: `42s`, `5m`, `3h`, `2d`.
fn format_age(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0) as u64;
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
