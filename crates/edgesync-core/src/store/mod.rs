//! Record store trait for storage abstraction.

mod sql;
mod sqlite;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use edgesync_types::{PeerId, RecordBatch, Table, VersionToken};

use crate::error::StoreResult;

pub use sqlite::SqliteRecordStore;

/// Row of `table_version` holding the coordinator's aggregate token.
pub const MASTER_TOKEN_ROW: &str = "modem_slaves";

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Upsert every record by the table's natural key inside one transaction.
    ///
    /// Returns the number of records written. An empty batch yields
    /// [`StoreError::EmptyBatch`](crate::StoreError::EmptyBatch); any other error means the
    /// whole batch was rolled back.
    async fn merge_write(&self, batch: &RecordBatch) -> StoreResult<usize>;

    /// Read a table, optionally narrowed to the rows attributed to one peer.
    async fn fetch(&self, table: Table, peer: Option<&PeerId>) -> StoreResult<RecordBatch>;

    /// `Ok(None)` when no token row exists or its value is not an integer.
    async fn current_token(&self) -> StoreResult<Option<VersionToken>>;

    async fn put_token(&self, token: VersionToken) -> StoreResult<()>;
}
