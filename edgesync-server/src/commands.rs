#![allow(clippy::print_stdout, reason = "CLI subcommands report to the terminal")]

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use std::sync::Arc;
use tracing::info;

use edgesync_core::{CycleReport, PeerOutcome, RecordStore, SqliteRecordStore, Synchronizer};
use edgesync_types::VersionToken;

use crate::cli::{Cli, TokenCommands};
use crate::router::build_router;
use crate::server_utils::{create_listener, shutdown_signal};
use crate::state::AppState;

async fn open_store(cli: &Cli) -> Result<Arc<SqliteRecordStore>> {
    let store = SqliteRecordStore::new(&cli.database_url)?;
    store.migrate().await?;
    Ok(Arc::new(store))
}

fn build_engine(cli: &Cli, store: Arc<SqliteRecordStore>) -> Result<Synchronizer> {
    Ok(Synchronizer::new(cli.sync_config(), store, Arc::new(cli.resolver()))?)
}

pub async fn handle_serve(cli: &Cli, no_sync: bool) -> Result<()> {
    info!("[Server] EdgeSync {} starting", env!("CARGO_PKG_VERSION"));
    let store = open_store(cli).await?;

    let engine = if no_sync {
        info!("[Server] Sync loop disabled (--no-sync)");
        None
    } else if cli.peers.is_empty() {
        info!("[Server] No peers configured, serving as a peer node");
        None
    } else {
        Some(build_engine(cli, Arc::clone(&store))?.start())
    };

    let app = build_router(AppState::new(store));
    let listener = create_listener(&cli.host, cli.port).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    if let Some(handle) = engine {
        info!("[Server] Waiting for the sync loop to stop");
        handle.shutdown().await?;
    }
    info!("[Server] Stopped");
    Ok(())
}

pub async fn handle_sync(cli: &Cli, once: bool) -> Result<()> {
    if cli.peers.is_empty() {
        anyhow::bail!("No peers configured (use --peer or PEER_MACS)");
    }
    let store = open_store(cli).await?;
    let engine = build_engine(cli, store)?;

    if once {
        let report = engine.run_cycle().await?;
        print_report(&report);
        return Ok(());
    }

    let handle = engine.start();
    shutdown_signal().await;
    handle.shutdown().await?;
    Ok(())
}

fn print_report(report: &CycleReport) {
    if report.peers.is_empty() {
        println!("{}", "No peers processed.".yellow());
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Peer", "Outcome"]);

    for (peer, outcome) in &report.peers {
        let color = match outcome {
            PeerOutcome::Skipped(_) => Color::Red,
            PeerOutcome::Unchanged => Color::Grey,
            PeerOutcome::Pushed(_) | PeerOutcome::Pulled(_) => Color::Green,
        };
        table.add_row(vec![Cell::new(peer), Cell::new(outcome).fg(color)]);
    }

    println!("{table}");
    println!(
        "\n{} peer(s): {} transferred, {} skipped",
        report.peers.len(),
        report.transferred(),
        report.skipped()
    );
}

pub async fn handle_token(cli: &Cli, cmd: &TokenCommands) -> Result<()> {
    let store = open_store(cli).await?;
    match cmd {
        TokenCommands::Show { json } => {
            let token = store.current_token().await?;
            if *json {
                println!("{}", serde_json::json!({ "token": token }));
            } else {
                match token {
                    Some(token) => println!("Token: {}", token.to_string().cyan()),
                    None => println!("{}", "No token set.".yellow()),
                }
            }
        }
        TokenCommands::Set { value } => {
            store.put_token(VersionToken::new(*value)).await?;
            println!("{} Token set to {}", "✓".green(), value);
        }
    }
    Ok(())
}

pub async fn handle_migrate(cli: &Cli) -> Result<()> {
    open_store(cli).await?;
    println!("{} Database schema is up to date ({})", "✓".green(), cli.database_url);
    Ok(())
}
