//! Chronicle — remote journal front-matter sync CLI.
//!
//! # Usage
//!
//! ```text
//! chronicle config set-folder <id>
//! chronicle config set-remote <url> [--token <token>]
//! chronicle config show
//! chronicle sync [--folder <id>]
//! chronicle status [--json]
//! ```

mod checkpoint;
mod commands;
mod presenter;
mod remote;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigCommand, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "chronicle",
    version,
    about = "Keep remote journal front-matter in sync with its policy",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the Chronicle configuration file.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Reconcile remote journal entries modified since the last checkpoint.
    Sync(SyncArgs),

    /// Show configured folder, remote endpoint and checkpoint age.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Config { command } => commands::config::run(command),
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
