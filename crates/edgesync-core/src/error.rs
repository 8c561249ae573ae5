//! Error types for storage, transfer and the sync cycle.

use edgesync_types::RecordError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Merge-write called with nothing to write. Not a fault; callers usually log and move on.
    #[error("no records to merge into '{0}'")]
    EmptyBatch(&'static str),

    /// Connection, constraint or query failure. Any open transaction has been rolled back.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Stored rows that no longer fit the typed record.
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl StoreError {
    pub fn is_empty_batch(&self) -> bool {
        matches!(self, StoreError::EmptyBatch(_))
    }
}

/// Peer HTTP failures. The transfer client never lets these escape; they are logged and
/// degraded to an unknown token, an empty batch or a failed push.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: reqwest::StatusCode },

    #[error("invalid JSON response from {url}: {source}")]
    Format {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response from {url} has no usable '{field}' field")]
    MissingField { url: String, field: &'static str },

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl TransferError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            TransferError::Timeout { url: url.to_string() }
        } else {
            TransferError::Transport { url: url.to_string(), source }
        }
    }
}

/// Failure that aborts a whole cycle. Per-peer problems never surface here.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to read master token: {0}")]
    MasterToken(#[source] StoreError),
}
