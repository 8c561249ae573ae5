//! Typed records, one struct per table.
//!
//! Each struct carries exactly the table's payload columns. Volatile columns (surrogate ids,
//! creation and update timestamps) are not fields, so decoding drops them wherever they come
//! from and encoding can never emit them.
//!
//! Optional columns without a value are left out when encoding. A merge only overwrites the
//! columns a record carries, so a partial record never clears what it did not send.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecordError;
use crate::models::table::Table;
use crate::models::timestamp;

/// A typed row of a specific table.
pub trait TableRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: Table;
}

/// Row of `slaves_modem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModemRecord {
    pub modem_serial_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modem_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub last_seen: Option<NaiveDateTime>,
}

impl TableRecord for ModemRecord {
    const TABLE: Table = Table::Modem;
}

/// Row of `slaves_equipment`. Attributed to the peer through `modem_serial_no`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub equipment_serial_no: String,
    pub modem_serial_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub installed_at: Option<NaiveDateTime>,
}

impl TableRecord for EquipmentRecord {
    const TABLE: Table = Table::Equipment;
}

/// Row of `live_data`: latest reading of one parameter of one piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveDataRecord {
    pub modem_serial_no: String,
    pub equipment_serial_no: String,
    pub parameter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub recorded_at: Option<NaiveDateTime>,
}

impl TableRecord for LiveDataRecord {
    const TABLE: Table = Table::LiveData;
}

/// A batch of records belonging to a single table.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBatch {
    Modem(Vec<ModemRecord>),
    Equipment(Vec<EquipmentRecord>),
    LiveData(Vec<LiveDataRecord>),
}

impl RecordBatch {
    pub fn empty(table: Table) -> Self {
        match table {
            Table::Modem => RecordBatch::Modem(Vec::new()),
            Table::Equipment => RecordBatch::Equipment(Vec::new()),
            Table::LiveData => RecordBatch::LiveData(Vec::new()),
        }
    }

    pub fn table(&self) -> Table {
        match self {
            RecordBatch::Modem(_) => Table::Modem,
            RecordBatch::Equipment(_) => Table::Equipment,
            RecordBatch::LiveData(_) => Table::LiveData,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordBatch::Modem(rows) => rows.len(),
            RecordBatch::Equipment(rows) => rows.len(),
            RecordBatch::LiveData(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode JSON records received for `table`. Unknown keys, volatile ones included, are
    /// ignored. The whole batch fails if any record does not fit the table.
    pub fn from_json(table: Table, values: Vec<Value>) -> Result<Self, RecordError> {
        Ok(match table {
            Table::Modem => RecordBatch::Modem(decode(table, values)?),
            Table::Equipment => RecordBatch::Equipment(decode(table, values)?),
            Table::LiveData => RecordBatch::LiveData(decode(table, values)?),
        })
    }

    /// Decode rows read from a store, keyed by column name.
    pub fn from_rows(table: Table, rows: Vec<Map<String, Value>>) -> Result<Self, RecordError> {
        Self::from_json(table, rows.into_iter().map(Value::Object).collect())
    }

    /// Encode as wire records, timestamps in canonical text form.
    pub fn to_json(&self) -> Result<Vec<Value>, RecordError> {
        match self {
            RecordBatch::Modem(rows) => encode(rows),
            RecordBatch::Equipment(rows) => encode(rows),
            RecordBatch::LiveData(rows) => encode(rows),
        }
    }

    /// Encode as column maps, ready to be bound in the table's column order.
    pub fn to_rows(&self) -> Result<Vec<Map<String, Value>>, RecordError> {
        let table = self.table();
        self.to_json()?
            .into_iter()
            .map(|value| match value {
                Value::Object(map) => Ok(map),
                other => Err(RecordError::Encode {
                    table,
                    source: serde::ser::Error::custom(format!("expected an object, got {other}")),
                }),
            })
            .collect()
    }
}

fn decode<T: TableRecord>(table: Table, values: Vec<Value>) -> Result<Vec<T>, RecordError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|source| RecordError::Decode {
                table,
                index,
                source,
            })
        })
        .collect()
}

fn encode<T: TableRecord>(rows: &[T]) -> Result<Vec<Value>, RecordError> {
    rows.iter()
        .map(|row| {
            serde_json::to_value(row).map_err(|source| RecordError::Encode {
                table: T::TABLE,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_volatile_columns_are_stripped_on_decode() {
        let batch = RecordBatch::from_json(
            Table::Modem,
            vec![json!({
                "modem_id": 17,
                "modem_serial_no": "12:81:08:b1:66:b6",
                "modem_name": "north-gate",
                "created_date": "2024-01-01 00:00:00",
                "updated_at": "2024-01-02 00:00:00",
                "last_seen": "2024-05-01 12:30:00"
            })],
        )
        .expect("valid modem record");

        let encoded = batch.to_json().expect("encode");
        let record = encoded[0].as_object().expect("object");
        for volatile in Table::Modem.spec().volatile {
            assert!(!record.contains_key(*volatile), "{volatile} leaked");
        }
        assert_eq!(record["last_seen"], json!("2024-05-01T12:30:00"));
        assert_eq!(record["modem_name"], json!("north-gate"));
    }

    #[test]
    fn test_encoded_keys_are_table_columns() {
        let batches = [
            RecordBatch::from_json(Table::Modem, vec![json!({"modem_serial_no": "a"})]),
            RecordBatch::from_json(
                Table::Equipment,
                vec![json!({"equipment_serial_no": "e", "modem_serial_no": "a"})],
            ),
            RecordBatch::from_json(
                Table::LiveData,
                vec![json!({
                    "modem_serial_no": "a",
                    "equipment_serial_no": "e",
                    "parameter": "voltage"
                })],
            ),
        ];
        for batch in batches {
            let batch = batch.expect("minimal record");
            let spec = batch.table().spec();
            let rows = batch.to_rows().expect("rows");
            for key in rows[0].keys() {
                assert!(spec.columns.iter().any(|c| c.name == key.as_str()), "{} has no column {key}", spec.table);
            }
            for key in spec.key {
                assert!(rows[0].contains_key(*key), "{} lost key {key}", spec.table);
            }
            assert!(rows[0].contains_key(spec.peer_column));
        }
    }

    #[test]
    fn test_unsent_optional_columns_are_not_encoded() {
        let batch = RecordBatch::from_json(
            Table::Modem,
            vec![json!({"modem_serial_no": "a", "status": "online", "location": null})],
        )
        .expect("partial record");
        let rows = batch.to_rows().expect("rows");
        let mut keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["modem_serial_no", "status"]);
    }

    #[test]
    fn test_missing_key_column_fails_whole_batch() {
        let result = RecordBatch::from_json(
            Table::Equipment,
            vec![
                json!({"equipment_serial_no": "e1", "modem_serial_no": "a"}),
                json!({"equipment_serial_no": "e2"}),
            ],
        );
        match result {
            Err(RecordError::Decode { table, index, .. }) => {
                assert_eq!(table, Table::Equipment);
                assert_eq!(index, 1);
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_batch() {
        let batch = RecordBatch::empty(Table::LiveData);
        assert!(batch.is_empty());
        assert_eq!(batch.table(), Table::LiveData);
        assert_eq!(batch.to_json().expect("encode"), Vec::<Value>::new());
    }
}
