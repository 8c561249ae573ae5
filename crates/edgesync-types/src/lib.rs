//! # EdgeSync Types
//!
//! Core types, typed records and wire payloads shared by the EdgeSync crates.
//!
//! - **`error`** - Typed errors for table lookup, record decoding and peer identities
//! - **`models`** - Tables and their mapping, typed records, version tokens, peers
//! - **`protocol`** - JSON bodies exchanged between coordinator and peers
//!
//! ## Architecture Role
//!
//! ```text
//!                edgesync-types (this crate)
//!                        │
//!                        ▼
//!                  edgesync-core
//!                        │
//!                        ▼
//!                 edgesync-server
//! ```
//!
//! Nothing here performs I/O. Types are serializable via serde and cheap to clone.

#![allow(
    clippy::derive_partial_eq_without_eq,
    reason = "Records carry f64 readings and intentionally don't implement Eq"
)]
#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

pub mod error;
pub mod models;
pub mod protocol;

pub use error::{PeerIdError, RecordError, UnknownTable};
pub use models::{
    Column, ColumnKind, EquipmentRecord, LiveDataRecord, ModemRecord, PeerId, RecordBatch, Table,
    TableMapping, TableRecord, TableSpec, VersionToken,
};
