//! Configuration for the sync engine.

use edgesync_types::{PeerId, TableMapping};
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_COMPARE_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_PEER_PORT: u16 = 5100;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Peer hardware identities, in the order they are processed each cycle.
    pub peers: Vec<PeerId>,
    /// Tables synchronized for every peer, in order.
    pub tables: TableMapping,
    /// Applies to every peer request.
    pub request_timeout: Duration,
    /// Sleep between two cycles.
    pub compare_interval: Duration,
}

impl SyncConfig {
    pub fn new(peers: Vec<PeerId>) -> Self {
        Self {
            peers,
            tables: TableMapping::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            compare_interval: DEFAULT_COMPARE_INTERVAL,
        }
    }

    pub fn with_tables(mut self, tables: TableMapping) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_compare_interval(mut self, interval: Duration) -> Self {
        self.compare_interval = interval;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
