//! Error types for domain parsing and record decoding.

use thiserror::Error;

use crate::models::Table;

/// A wire or store name that does not belong to any known table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown table: {0}")]
pub struct UnknownTable(pub String);

/// A peer identity that is not a valid hardware (MAC) address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid peer identity '{0}': expected a MAC address like 12:81:08:b1:66:b6")]
pub struct PeerIdError(pub String);

/// Failure to convert between JSON records and a table's typed record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A record did not match the table's field set.
    #[error("invalid {table} record at index {index}: {source}")]
    Decode {
        table: Table,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A typed record could not be turned into a JSON object.
    #[error("failed to encode {table} record: {source}")]
    Encode {
        table: Table,
        #[source]
        source: serde_json::Error,
    },
}
