//! Domain models shared by the coordinator and its peers.

pub mod peer;
pub mod record;
pub mod table;
pub mod timestamp;
pub mod token;

pub use peer::PeerId;
pub use record::{EquipmentRecord, LiveDataRecord, ModemRecord, RecordBatch, TableRecord};
pub use table::{Column, ColumnKind, Table, TableMapping, TableSpec};
pub use token::VersionToken;
