//! SQLite implementation of the record store.
//!
//! Every operation opens its own connection and drops it when the operation returns, on
//! success and error paths alike. No connection is shared between the sync engine and the
//! request handlers; concurrent writers are serialized by SQLite itself.

use async_trait::async_trait;
use edgesync_types::{PeerId, RecordBatch, Table, VersionToken};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection, Row, SqliteConnection};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use super::sql::{bind_column, present_columns, row_to_map, select_statement, upsert_statement};
use super::{RecordStore, MASTER_TOKEN_ROW};
use crate::error::{StoreError, StoreResult};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteRecordStore {
    options: SqliteConnectOptions,
}

impl SqliteRecordStore {
    /// Store addressed by a `sqlite://` URL. The database file is created if missing.
    pub fn new(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?;
        Ok(Self::with_options(options))
    }

    /// Store backed by the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::with_options(SqliteConnectOptions::new().filename(path))
    }

    fn with_options(options: SqliteConnectOptions) -> Self {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        Self { options }
    }

    async fn connect(&self) -> StoreResult<SqliteConnection> {
        Ok(self.options.connect().await?)
    }

    /// Create or upgrade the schema.
    pub async fn migrate(&self) -> StoreResult<()> {
        let mut conn = self.connect().await?;
        sqlx::migrate!("./migrations").run(&mut conn).await?;
        Ok(())
    }

    async fn write_batch(&self, batch: &RecordBatch) -> StoreResult<usize> {
        let spec = batch.table().spec();
        let rows = batch.to_rows()?;

        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        for row in &rows {
            let columns = present_columns(spec, row);
            let statement = upsert_statement(spec, &columns);
            let mut query = sqlx::query(&statement);
            for column in columns {
                query = bind_column(query, column, row.get(column.name));
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(rows.len())
    }

    async fn read_table(&self, table: Table, peer: Option<&PeerId>) -> StoreResult<RecordBatch> {
        let spec = table.spec();
        let statement = select_statement(spec, peer.is_some());

        let mut conn = self.connect().await?;
        let mut query = sqlx::query(&statement);
        if let Some(peer) = peer {
            query = query.bind(peer.as_str());
        }
        let rows = query.fetch_all(&mut conn).await?;

        let maps = rows
            .iter()
            .map(|row| row_to_map(spec, row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RecordBatch::from_rows(table, maps)?)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn merge_write(&self, batch: &RecordBatch) -> StoreResult<usize> {
        let store_name = batch.table().store_name();
        if batch.is_empty() {
            tracing::warn!("[Store] No data provided for insertion into '{}'", store_name);
            return Err(StoreError::EmptyBatch(store_name));
        }

        match self.write_batch(batch).await {
            Ok(written) => {
                tracing::info!("[Store] Merged {} record(s) into '{}'", written, store_name);
                Ok(written)
            }
            Err(e) => {
                tracing::error!("[Store] Error inserting data into '{}': {}", store_name, e);
                Err(e)
            }
        }
    }

    async fn fetch(&self, table: Table, peer: Option<&PeerId>) -> StoreResult<RecordBatch> {
        self.read_table(table, peer).await.inspect_err(|e| {
            tracing::error!("[Store] Error fetching data from '{}': {}", table.store_name(), e);
        })
    }

    async fn current_token(&self) -> StoreResult<Option<VersionToken>> {
        let mut conn = self.connect().await?;
        let row = sqlx::query("SELECT CAST(token AS TEXT) AS token FROM table_version WHERE table_name = ?")
            .bind(MASTER_TOKEN_ROW)
            .fetch_optional(&mut conn)
            .await?;

        let raw: Option<String> = match row {
            Some(row) => row.try_get("token")?,
            None => None,
        };
        let token = raw.as_deref().and_then(VersionToken::parse_text);
        match (&raw, token) {
            (_, Some(token)) => tracing::debug!("[Store] Master token retrieved: {}", token),
            (Some(raw), None) => tracing::debug!("[Store] Master token '{}' is not an integer", raw),
            (None, None) => {}
        }
        Ok(token)
    }

    async fn put_token(&self, token: VersionToken) -> StoreResult<()> {
        let mut conn = self.connect().await?;
        sqlx::query(
            r#"INSERT INTO table_version (table_name, token) VALUES (?, ?)
               ON CONFLICT (table_name) DO UPDATE SET token = excluded.token"#,
        )
        .bind(MASTER_TOKEN_ROW)
        .bind(token.get())
        .execute(&mut conn)
        .await?;
        Ok(())
    }
}
