//! Version tokens: the coordinator's own and the one each peer reports.

use edgesync_types::VersionToken;
use std::sync::Arc;

use crate::error::StoreResult;
use crate::store::RecordStore;
use crate::transfer::PeerClient;

/// Read-only view over both sides of a token comparison.
#[derive(Clone)]
pub struct TokenOracle {
    store: Arc<dyn RecordStore>,
    client: PeerClient,
}

impl TokenOracle {
    pub fn new(store: Arc<dyn RecordStore>, client: PeerClient) -> Self {
        Self { store, client }
    }

    /// The coordinator's token. `Ok(None)` when no usable row exists.
    pub async fn current_token(&self) -> StoreResult<Option<VersionToken>> {
        let token = self.store.current_token().await?;
        if token.is_none() {
            tracing::error!("[Sync] Master token not found or not an integer in table_version");
        }
        Ok(token)
    }

    /// The token reported by the peer at `endpoint`, `None` on any failure.
    pub async fn peer_token(&self, endpoint: &str) -> Option<VersionToken> {
        self.client.token(endpoint).await
    }
}
