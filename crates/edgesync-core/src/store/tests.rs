use edgesync_types::{PeerId, RecordBatch, Table, VersionToken};
use serde_json::{json, Value};
use tempfile::TempDir;

use super::{RecordStore, SqliteRecordStore};

const PEER_A: &str = "12:81:08:b1:66:b6";
const PEER_B: &str = "12:81:f8:16:b9:f9";

async fn temp_store() -> (SqliteRecordStore, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let store = SqliteRecordStore::open(dir.path().join("edgesync.db"));
    store.migrate().await.expect("migrations apply");
    (store, dir)
}

fn peer(mac: &str) -> PeerId {
    mac.parse().expect("valid mac")
}

fn modem_batch(values: Vec<Value>) -> RecordBatch {
    RecordBatch::from_json(Table::Modem, values).expect("valid modem records")
}

#[tokio::test]
async fn test_merge_write_then_fetch_round_trips_payload() {
    let (store, _tmp) = temp_store().await;
    let batch = modem_batch(vec![
        json!({"modem_serial_no": PEER_A, "modem_name": "north", "last_seen": "2024-05-01T12:30:00"}),
        json!({"modem_serial_no": PEER_B, "modem_name": "south", "status": "online"}),
    ]);

    let written = store.merge_write(&batch).await.expect("merge succeeds");
    assert_eq!(written, 2);

    let stored = store.fetch(Table::Modem, None).await.expect("fetch succeeds");
    assert_eq!(stored, batch);
}

#[tokio::test]
async fn test_merge_write_is_idempotent() {
    let (store, _tmp) = temp_store().await;
    let batch = RecordBatch::from_json(
        Table::LiveData,
        vec![json!({
            "modem_serial_no": PEER_A,
            "equipment_serial_no": "EQ-1",
            "parameter": "voltage",
            "value": 229.5,
            "unit": "V"
        })],
    )
    .expect("valid live data");

    store.merge_write(&batch).await.expect("first merge");
    store.merge_write(&batch).await.expect("second merge");

    let stored = store.fetch(Table::LiveData, None).await.expect("fetch");
    assert_eq!(stored, batch);
}

#[tokio::test]
async fn test_merge_write_overwrites_non_key_columns() {
    let (store, _tmp) = temp_store().await;
    store
        .merge_write(&modem_batch(vec![json!({"modem_serial_no": PEER_A, "status": "offline"})]))
        .await
        .expect("insert");
    store
        .merge_write(&modem_batch(vec![json!({"modem_serial_no": PEER_A, "status": "online"})]))
        .await
        .expect("update");

    let stored = store.fetch(Table::Modem, None).await.expect("fetch");
    let rows = stored.to_json().expect("encode");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], json!("online"));
}

#[tokio::test]
async fn test_partial_record_keeps_unsent_columns() {
    let (store, _tmp) = temp_store().await;
    store
        .merge_write(&modem_batch(vec![
            json!({"modem_serial_no": PEER_A, "modem_name": "north", "location": "gate"}),
        ]))
        .await
        .expect("insert");
    store
        .merge_write(&modem_batch(vec![json!({"modem_serial_no": PEER_A, "status": "online"})]))
        .await
        .expect("partial update");

    let rows = store.fetch(Table::Modem, None).await.expect("fetch").to_json().expect("encode");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["modem_name"], json!("north"));
    assert_eq!(rows[0]["location"], json!("gate"));
    assert_eq!(rows[0]["status"], json!("online"));
}

#[tokio::test]
async fn test_key_only_record_refreshes_touched_column() {
    let (store, tmp) = temp_store().await;
    let batch = RecordBatch::from_json(
        Table::LiveData,
        vec![json!({
            "modem_serial_no": PEER_A,
            "equipment_serial_no": "EQ-1",
            "parameter": "voltage",
            "value": 229.5
        })],
    )
    .expect("valid live data");
    store.merge_write(&batch).await.expect("insert");

    use sqlx::{Connection, Row};
    let url = format!("sqlite://{}", tmp.path().join("edgesync.db").display());
    let mut conn = sqlx::SqliteConnection::connect(&url).await.expect("connect");
    sqlx::query("UPDATE live_data SET timestamp = '2000-01-01 00:00:00'")
        .execute(&mut conn)
        .await
        .expect("age row");

    let key_only = RecordBatch::from_json(
        Table::LiveData,
        vec![json!({"modem_serial_no": PEER_A, "equipment_serial_no": "EQ-1", "parameter": "voltage"})],
    )
    .expect("key-only record");
    store.merge_write(&key_only).await.expect("merge");

    let row = sqlx::query("SELECT value, timestamp FROM live_data")
        .fetch_one(&mut conn)
        .await
        .expect("row");
    let value: f64 = row.get("value");
    let touched: String = row.get("timestamp");
    assert_eq!(value, 229.5);
    assert!(!touched.starts_with("2000"));
}

#[tokio::test]
async fn test_volatile_columns_are_never_stored_from_input() {
    let (store, tmp) = temp_store().await;
    store
        .merge_write(&modem_batch(vec![json!({
            "modem_id": 999,
            "modem_serial_no": PEER_A,
            "created_date": "1999-01-01 00:00:00"
        })]))
        .await
        .expect("merge");

    // read the raw row, volatile columns included
    use sqlx::{Connection, Row};
    let url = format!("sqlite://{}", tmp.path().join("edgesync.db").display());
    let mut conn = sqlx::SqliteConnection::connect(&url).await.expect("connect");
    let row = sqlx::query("SELECT modem_id, created_date FROM slaves_modem")
        .fetch_one(&mut conn)
        .await
        .expect("row");
    let modem_id: i64 = row.get("modem_id");
    let created: String = row.get("created_date");
    assert_ne!(modem_id, 999);
    assert!(!created.starts_with("1999"));
}

#[tokio::test]
async fn test_empty_batch_is_distinguishable() {
    let (store, _tmp) = temp_store().await;
    let err = store
        .merge_write(&RecordBatch::empty(Table::Equipment))
        .await
        .expect_err("empty batch rejected");
    assert!(err.is_empty_batch());
}

#[tokio::test]
async fn test_failed_record_rolls_back_whole_batch() {
    let (store, tmp) = temp_store().await;
    use sqlx::Connection;
    let url = format!("sqlite://{}", tmp.path().join("edgesync.db").display());
    let mut conn = sqlx::SqliteConnection::connect(&url).await.expect("connect");
    sqlx::query(
        "CREATE TRIGGER reject_bad BEFORE INSERT ON slaves_equipment \
         WHEN NEW.equipment_name = 'bad' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
    )
    .execute(&mut conn)
    .await
    .expect("trigger");
    drop(conn);

    let batch = RecordBatch::from_json(
        Table::Equipment,
        vec![
            json!({"equipment_serial_no": "EQ-1", "modem_serial_no": PEER_A, "equipment_name": "pump"}),
            json!({"equipment_serial_no": "EQ-2", "modem_serial_no": PEER_A, "equipment_name": "bad"}),
        ],
    )
    .expect("valid equipment");

    let err = store.merge_write(&batch).await.expect_err("constraint violation");
    assert!(!err.is_empty_batch());
    let stored = store.fetch(Table::Equipment, None).await.expect("fetch");
    assert!(stored.is_empty(), "partial batch was committed");
}

#[tokio::test]
async fn test_fetch_filters_by_peer_case_insensitively() {
    let (store, _tmp) = temp_store().await;
    let batch = RecordBatch::from_json(
        Table::Equipment,
        vec![
            json!({"equipment_serial_no": "EQ-1", "modem_serial_no": PEER_A.to_uppercase()}),
            json!({"equipment_serial_no": "EQ-2", "modem_serial_no": PEER_B}),
            json!({"equipment_serial_no": "EQ-3", "modem_serial_no": PEER_A}),
        ],
    )
    .expect("valid equipment");
    store.merge_write(&batch).await.expect("merge");

    let scoped = store.fetch(Table::Equipment, Some(&peer(PEER_A))).await.expect("fetch");
    let serials: Vec<Value> = scoped
        .to_json()
        .expect("encode")
        .into_iter()
        .map(|r| r["equipment_serial_no"].clone())
        .collect();
    assert_eq!(serials, vec![json!("EQ-1"), json!("EQ-3")]);

    let all = store.fetch(Table::Equipment, None).await.expect("fetch");
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_token_absent_then_present() {
    let (store, _tmp) = temp_store().await;
    assert_eq!(store.current_token().await.expect("read"), None);

    store.put_token(VersionToken::new(5)).await.expect("write");
    store.put_token(VersionToken::new(6)).await.expect("overwrite");
    assert_eq!(store.current_token().await.expect("read"), Some(VersionToken::new(6)));
}

#[tokio::test]
async fn test_text_token_is_parsed_and_garbage_is_unknown() {
    let (store, tmp) = temp_store().await;
    use sqlx::Connection;
    let url = format!("sqlite://{}", tmp.path().join("edgesync.db").display());
    let mut conn = sqlx::SqliteConnection::connect(&url).await.expect("connect");

    sqlx::query("INSERT INTO table_version (table_name, token) VALUES ('modem_slaves', ' 12 ')")
        .execute(&mut conn)
        .await
        .expect("insert");
    assert_eq!(store.current_token().await.expect("read"), Some(VersionToken::new(12)));

    sqlx::query("UPDATE table_version SET token = 'twelve'")
        .execute(&mut conn)
        .await
        .expect("update");
    assert_eq!(store.current_token().await.expect("read"), None);
}

#[tokio::test]
async fn test_unreachable_database_is_an_error() {
    let store = SqliteRecordStore::open("/nonexistent-dir/edgesync.db");
    assert!(store.current_token().await.is_err());
    assert!(store.fetch(Table::Modem, None).await.is_err());
}
