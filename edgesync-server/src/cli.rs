use clap::{Parser, Subcommand};
use std::time::Duration;

use edgesync_core::config::{DEFAULT_PEER_PORT, SyncConfig};
use edgesync_core::{ArpResolver, PeerEndpoint, StaticResolver};
use edgesync_types::{PeerId, Table, TableMapping};

#[derive(Parser)]
#[command(
    name = "edgesync",
    about = "EdgeSync - coordinator/peer table synchronization",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        default_value = "sqlite://edgesync.db?mode=rwc"
    )]
    pub database_url: String,

    #[arg(
        long = "peer",
        global = true,
        env = "PEER_MACS",
        value_delimiter = ',',
        help = "Peer MAC address, in sync order (repeatable or comma separated)"
    )]
    pub peers: Vec<PeerId>,

    #[arg(
        long = "peer-endpoint",
        global = true,
        env = "PEER_ENDPOINTS",
        value_delimiter = ',',
        help = "Fixed endpoint for a peer as MAC=URL, bypassing the ARP lookup"
    )]
    pub peer_endpoints: Vec<PeerEndpoint>,

    #[arg(long, global = true, env = "PEER_PORT", default_value_t = DEFAULT_PEER_PORT)]
    pub peer_port: u16,

    #[arg(long, global = true, env = "REQUEST_TIMEOUT", default_value = "10", help = "Seconds")]
    pub request_timeout: u64,

    #[arg(long, global = true, env = "COMPARE_INTERVAL", default_value = "10", help = "Seconds")]
    pub compare_interval: u64,

    #[arg(
        long,
        global = true,
        env = "SYNC_TABLES",
        value_delimiter = ',',
        default_value = "modem,equipment,live_data"
    )]
    pub sync_tables: Vec<Table>,

    #[arg(long, global = true, env = "EDGESYNC_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, global = true, env = "EDGESYNC_PORT", default_value = "5100")]
    pub port: u16,

    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server and, when peers are configured, the sync loop (default)")]
    Serve {
        #[arg(long, help = "Serve the HTTP API only")]
        no_sync: bool,
    },

    #[command(about = "Run the sync loop without the HTTP server")]
    Sync {
        #[arg(long, help = "Run a single cycle and print its report")]
        once: bool,
    },

    #[command(subcommand, about = "Inspect or change the local version token")]
    Token(TokenCommands),

    #[command(about = "Create or upgrade the database schema")]
    Migrate,
}

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Print the current token")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Overwrite the token")]
    Set {
        #[arg(help = "New token value", allow_negative_numbers = true)]
        value: i64,
    },
}

impl Cli {
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::new(self.peers.clone())
            .with_tables(TableMapping::new(self.sync_tables.iter().copied()))
            .with_request_timeout(Duration::from_secs(self.request_timeout))
            .with_compare_interval(Duration::from_secs(self.compare_interval))
    }

    pub fn resolver(&self) -> ArpResolver {
        ArpResolver::new(self.peer_port, StaticResolver::new(self.peer_endpoints.iter().cloned()))
    }
}
