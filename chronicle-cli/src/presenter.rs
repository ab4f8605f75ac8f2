//! Console presenter — glyph-per-item progress plus a run summary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;

use chronicle_sync::{ItemOutcome, ItemStatus, Presenter, SyncSummary};

pub struct ConsolePresenter {
    cancelled: Arc<AtomicBool>,
}

impl ConsolePresenter {
    pub fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self { cancelled }
    }
}

impl Presenter for ConsolePresenter {
    fn on_item(&mut self, outcome: &ItemOutcome) {
        match &outcome.status {
            ItemStatus::Updated { reason } => {
                println!("  {}  {} ({reason})", "✎".green(), outcome.name);
            }
            ItemStatus::NoChange => {
                println!("  {}  {}", "·".dimmed(), outcome.name);
            }
            ItemStatus::Failed { error } => {
                println!("  {}  {}: {error}", "✗".red(), outcome.name);
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn on_summary(&mut self, summary: &SyncSummary) {
        if summary.no_files() {
            println!("No files to reconcile — checkpoint is up to date.");
            return;
        }

        let prefix = if summary.cancelled { "cancelled — " } else { "" };
        println!(
            "{prefix}{} updated, {} unchanged, {} failed",
            summary.updated_count(),
            summary.no_change_count,
            summary.failed_count()
        );
        for (name, id) in &summary.updated {
            println!("  {} {name} ({id})", "updated".green());
        }
        for (name, id) in &summary.failed {
            println!("  {} {name} ({id})", "failed".red());
        }
        if !summary.failed.is_empty() {
            println!(
                "{}",
                "checkpoint not advanced; failed entries will be retried next run".yellow()
            );
        }
    }
}
