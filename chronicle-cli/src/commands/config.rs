//! `chronicle config` — manage `~/.chronicle/config.yaml`.

use anyhow::{Context, Result};
use clap::Subcommand;

use chronicle_core::{config, types::FolderId};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Set the remote journal folder id.
    SetFolder {
        /// Opaque folder identifier from the remote store.
        folder_id: String,
    },

    /// Set the remote document store endpoint.
    SetRemote {
        /// Base URL of the store's JSON API.
        url: String,

        /// Bearer token, if the store requires one.
        #[arg(long)]
        token: Option<String>,
    },

    /// Print the current configuration.
    Show,
}

pub fn run(command: ConfigCommand) -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory")?;

    match command {
        ConfigCommand::SetFolder { folder_id } => {
            let mut config = config::load_at(&home)?;
            config.folder_id = Some(FolderId::from(folder_id.clone()));
            config::save_at(&home, &config).context("failed to save config")?;
            println!("folder set to '{folder_id}'");
        }
        ConfigCommand::SetRemote { url, token } => {
            let mut config = config::load_at(&home)?;
            config.remote_url = Some(url.clone());
            if token.is_some() {
                config.api_token = token;
            }
            config::save_at(&home, &config).context("failed to save config")?;
            println!("remote set to '{url}'");
        }
        ConfigCommand::Show => {
            let config = config::load_at(&home)?;
            print_value("folder", config.folder_id.map(|f| f.0));
            print_value("remote", config.remote_url);
            print_value(
                "token",
                config.api_token.map(|_| "(set)".to_string()),
            );
            print_value(
                "checkpoint",
                config.last_sync_time.map(|t| t.to_rfc3339()),
            );
        }
    }
    Ok(())
}

fn print_value(label: &str, value: Option<String>) {
    match value {
        Some(v) => println!("{label}: {v}"),
        None => println!("{label}: (unset)"),
    }
}
