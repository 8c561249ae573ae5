//! Sync engine: one background loop comparing tokens and moving rows with every peer.
//!
//! Each cycle reads the master token once, resolves the peers, then walks them in configured
//! order. A peer's failure ends that peer's turn only. The loop sleeps between cycles and is
//! only ever stopped at that sleep.

mod decision;
mod report;


use edgesync_types::{PeerId, Table, VersionToken};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

use crate::config::SyncConfig;
use crate::error::{SyncError, TransferError};
use crate::oracle::TokenOracle;
use crate::peers::{PeerResolver, ResolvedPeer};
use crate::store::RecordStore;
use crate::transfer::PeerClient;

pub use decision::SyncDirection;
pub use report::{CycleReport, PeerOutcome, SkipReason};

pub struct Synchronizer {
    config: SyncConfig,
    store: Arc<dyn RecordStore>,
    client: PeerClient,
    resolver: Arc<dyn PeerResolver>,
    oracle: TokenOracle,
}

impl Synchronizer {
    pub fn new(
        config: SyncConfig,
        store: Arc<dyn RecordStore>,
        resolver: Arc<dyn PeerResolver>,
    ) -> Result<Self, TransferError> {
        let client = PeerClient::new(config.request_timeout)?;
        let oracle = TokenOracle::new(Arc::clone(&store), client.clone());
        Ok(Self { config, store, client, resolver, oracle })
    }

    /// One pass over every configured peer.
    ///
    /// Only a failure to read the local store's token aborts the cycle; everything that goes
    /// wrong with a single peer is logged and recorded in the report.
    pub async fn run_cycle(&self) -> Result<CycleReport, SyncError> {
        let master = self.oracle.current_token().await.map_err(SyncError::MasterToken)?;
        let resolved = self.resolver.resolve(&self.config.peers).await;

        let mut report = CycleReport::default();
        for peer in &resolved {
            let outcome = self.sync_peer(master, peer).await;
            report.peers.push((peer.id.clone(), outcome));
        }
        Ok(report)
    }

    async fn sync_peer(&self, master: Option<VersionToken>, peer: &ResolvedPeer) -> PeerOutcome {
        let Some(endpoint) = peer.endpoint.as_deref() else {
            tracing::warn!("[Sync] Skipping peer {}: no endpoint", peer.id);
            return PeerOutcome::Skipped(SkipReason::Unresolved);
        };

        let peer_token = match master {
            Some(_) => self.oracle.peer_token(endpoint).await,
            None => None,
        };

        match SyncDirection::decide(master, peer_token) {
            SyncDirection::Skip => {
                tracing::warn!("[Sync] Skipping peer {}: token unknown", peer.id);
                PeerOutcome::Skipped(SkipReason::UnknownToken)
            }
            SyncDirection::Noop => {
                tracing::info!("[Sync] Peer {} is up to date", peer.id);
                PeerOutcome::Unchanged
            }
            SyncDirection::Push => {
                tracing::info!(
                    "[Sync] Master token {:?} ahead of peer {} ({:?}), pushing",
                    master,
                    peer.id,
                    peer_token
                );
                PeerOutcome::Pushed(self.push_tables(&peer.id, endpoint).await)
            }
            SyncDirection::Pull => {
                tracing::info!(
                    "[Sync] Peer {} token {:?} ahead of master ({:?}), pulling",
                    peer.id,
                    peer_token,
                    master
                );
                PeerOutcome::Pulled(self.pull_tables(endpoint).await)
            }
        }
    }

    async fn push_tables(&self, peer: &PeerId, endpoint: &str) -> Vec<Table> {
        let mut pushed = Vec::new();
        for table in self.config.tables.iter() {
            let batch = match self.store.fetch(table, Some(peer)).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::error!("[Sync] Could not read '{}' for peer {}: {}", table, peer, e);
                    continue;
                }
            };
            if batch.is_empty() {
                tracing::debug!("[Sync] No '{}' rows for peer {}", table, peer);
                continue;
            }
            if self.client.push(endpoint, &batch).await {
                pushed.push(table);
            }
        }
        pushed
    }

    async fn pull_tables(&self, endpoint: &str) -> Vec<Table> {
        let mut pulled = Vec::new();
        for table in self.config.tables.iter() {
            let batch = self.client.pull(endpoint, table).await;
            if batch.is_empty() {
                continue;
            }
            match self.store.merge_write(&batch).await {
                Ok(count) => {
                    tracing::info!("[Sync] Merged {} '{}' row(s) from {}", count, table, endpoint);
                    pulled.push(table);
                }
                Err(e) => {
                    tracing::error!("[Sync] Failed to store '{}' from {}: {}", table, endpoint, e);
                }
            }
        }
        pulled
    }

    /// Spawn the loop. Consumes the engine so it can only be started once.
    pub fn start(self) -> SyncHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        SyncHandle { stop: stop_tx, task }
    }

    async fn run(self, mut stop: watch::Receiver<bool>) {
        tracing::info!(
            "[Sync] Engine started ({} peer(s), {} table(s), interval {}s)",
            self.config.peers.len(),
            self.config.tables.len(),
            self.config.compare_interval.as_secs()
        );
        if self.config.tables.is_empty() {
            tracing::warn!("[Sync] No tables mapped, cycles will only compare tokens");
        }

        loop {
            match AssertUnwindSafe(self.run_cycle()).catch_unwind().await {
                Ok(Ok(report)) => tracing::debug!(
                    "[Sync] Cycle done: {} transferred, {} skipped",
                    report.transferred(),
                    report.skipped()
                ),
                Ok(Err(e)) => tracing::error!("[Sync] Cycle failed: {}", e),
                Err(panic) => tracing::error!("[Sync] Cycle panicked: {}", panic_message(&*panic)),
            }

            if *stop.borrow_and_update() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.config.compare_interval) => {}
                // A dropped handle also ends the loop.
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow_and_update() {
                        break;
                    }
                }
            }
        }

        tracing::info!("[Sync] Engine stopped");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Owner of a running engine task.
pub struct SyncHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Ask the loop to end at its next sleep.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }

    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.stop();
        self.join().await
    }
}
