//! EdgeSync Server
//!
//! One binary for both roles:
//! - every node serves `/receive_data/{table}`, `/get_token` and `/send_data/{table}`
//! - a node configured with peers also runs the sync loop against them
//!
//! Access via: http://localhost:5100

#![cfg_attr(
    test,
    allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)
)]

use anyhow::Result;
use clap::Parser;

mod api;
mod cli;
mod commands;
mod router;
mod server_utils;
mod state;

#[cfg(test)]
mod test_helpers;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    edgesync_core::logger::init_logging(&cli.log_level)?;

    match cli.command {
        None => commands::handle_serve(&cli, false).await,
        Some(Commands::Serve { no_sync }) => commands::handle_serve(&cli, no_sync).await,
        Some(Commands::Sync { once }) => commands::handle_sync(&cli, once).await,
        Some(Commands::Token(ref cmd)) => commands::handle_token(&cli, cmd).await,
        Some(Commands::Migrate) => commands::handle_migrate(&cli).await,
    }
}
