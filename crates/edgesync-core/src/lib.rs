//! # EdgeSync Core
//!
//! Keeps a coordinator and a fixed set of edge peers eventually consistent.
//!
//! ```text
//! engine/        # Sync loop: compare tokens, decide direction, dispatch per table
//! oracle.rs      # Local and remote version tokens
//! transfer.rs    # HTTP push / pull / token client
//! peers.rs       # MAC -> endpoint resolution (ARP table + static overrides)
//! store/         # RecordStore trait, SQLite implementation, migrations
//! config.rs      # Engine configuration
//! logger.rs      # tracing subscriber setup
//! ```

#![allow(
    clippy::significant_drop_tightening,
    reason = "Transactions and connections are held for the whole operation on purpose"
)]
// Test-only lints: allow panic!, unwrap, float comparisons in test code
#![cfg_attr(
    test,
    allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)
)]

pub mod config;
pub mod engine;
pub mod error;
pub mod logger;
pub mod oracle;
pub mod peers;
pub mod store;
pub mod transfer;


pub use config::SyncConfig;
pub use engine::{CycleReport, PeerOutcome, SkipReason, SyncDirection, SyncHandle, Synchronizer};
pub use error::{StoreError, StoreResult, SyncError, TransferError};
pub use oracle::TokenOracle;
pub use peers::{ArpResolver, PeerEndpoint, PeerResolver, ResolvedPeer, StaticResolver};
pub use store::{RecordStore, SqliteRecordStore};
pub use transfer::PeerClient;
