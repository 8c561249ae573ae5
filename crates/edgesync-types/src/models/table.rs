//! Table identities, their static descriptors and the wire/store mapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownTable;

/// One of the tables mastered by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Modem,
    Equipment,
    LiveData,
}

/// Storage class of a payload column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Real,
    /// Stored and transferred in the canonical text form, see [`crate::models::timestamp`].
    Timestamp,
}

/// A payload column: transferred between nodes and written by merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

/// Static descriptor of a table.
///
/// `columns` is the explicit payload field set, in statement order. Volatile columns are
/// assigned by the store that owns the row and never appear in `columns`.
#[derive(Debug)]
pub struct TableSpec {
    pub table: Table,
    /// Name used in URLs (`/receive_data/{wire_name}`).
    pub wire_name: &'static str,
    /// Physical table name.
    pub store_name: &'static str,
    pub columns: &'static [Column],
    /// Natural unique key used by merge-write.
    pub key: &'static [&'static str],
    pub volatile: &'static [&'static str],
    /// Column holding the peer hardware identity a row is attributed to.
    pub peer_column: &'static str,
    /// Volatile column refreshed by the store whenever merge-write overwrites a row.
    pub touched_column: Option<&'static str>,
}

static MODEM: TableSpec = TableSpec {
    table: Table::Modem,
    wire_name: "modem",
    store_name: "slaves_modem",
    columns: &[
        col("modem_serial_no", ColumnKind::Text),
        col("modem_name", ColumnKind::Text),
        col("ip_address", ColumnKind::Text),
        col("firmware_version", ColumnKind::Text),
        col("status", ColumnKind::Text),
        col("location", ColumnKind::Text),
        col("last_seen", ColumnKind::Timestamp),
    ],
    key: &["modem_serial_no"],
    volatile: &["modem_id", "created_date", "updated_at"],
    peer_column: "modem_serial_no",
    touched_column: Some("updated_at"),
};

static EQUIPMENT: TableSpec = TableSpec {
    table: Table::Equipment,
    wire_name: "equipment",
    store_name: "slaves_equipment",
    columns: &[
        col("equipment_serial_no", ColumnKind::Text),
        col("modem_serial_no", ColumnKind::Text),
        col("equipment_name", ColumnKind::Text),
        col("equipment_type", ColumnKind::Text),
        col("status", ColumnKind::Text),
        col("installed_at", ColumnKind::Timestamp),
    ],
    key: &["equipment_serial_no"],
    volatile: &["equipment_id", "created_at", "updated_at"],
    peer_column: "modem_serial_no",
    touched_column: Some("updated_at"),
};

static LIVE_DATA: TableSpec = TableSpec {
    table: Table::LiveData,
    wire_name: "live_data",
    store_name: "live_data",
    columns: &[
        col("modem_serial_no", ColumnKind::Text),
        col("equipment_serial_no", ColumnKind::Text),
        col("parameter", ColumnKind::Text),
        col("value", ColumnKind::Real),
        col("unit", ColumnKind::Text),
        col("recorded_at", ColumnKind::Timestamp),
    ],
    key: &["equipment_serial_no", "parameter"],
    volatile: &["id", "timestamp"],
    peer_column: "modem_serial_no",
    touched_column: Some("timestamp"),
};

impl Table {
    pub const ALL: [Table; 3] = [Table::Modem, Table::Equipment, Table::LiveData];

    pub fn spec(self) -> &'static TableSpec {
        match self {
            Table::Modem => &MODEM,
            Table::Equipment => &EQUIPMENT,
            Table::LiveData => &LIVE_DATA,
        }
    }

    pub fn wire_name(self) -> &'static str {
        self.spec().wire_name
    }

    pub fn store_name(self) -> &'static str {
        self.spec().store_name
    }

    pub fn from_wire(name: &str) -> Option<Table> {
        Self::ALL.into_iter().find(|t| t.wire_name() == name)
    }

    pub fn from_store(name: &str) -> Option<Table> {
        Self::ALL.into_iter().find(|t| t.store_name() == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Table {
    type Err = UnknownTable;

    /// Accepts either the wire name or the store name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Table::from_wire(name)
            .or_else(|| Table::from_store(name))
            .ok_or_else(|| UnknownTable(name.to_string()))
    }
}

/// Ordered set of tables the sync engine walks for every peer.
///
/// Tables absent from the mapping are never synchronized, though the HTTP surface still
/// accepts all known tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMapping {
    tables: Vec<Table>,
}

impl TableMapping {
    /// Build a mapping in the given order. Duplicates keep their first position.
    pub fn new(tables: impl IntoIterator<Item = Table>) -> Self {
        let mut ordered = Vec::new();
        for table in tables {
            if !ordered.contains(&table) {
                ordered.push(table);
            }
        }
        Self { tables: ordered }
    }

    pub fn iter(&self) -> impl Iterator<Item = Table> + '_ {
        self.tables.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Default for TableMapping {
    fn default() -> Self {
        Self::new(Table::ALL)
    }
}
