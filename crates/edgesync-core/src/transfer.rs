//! Transfer protocol client: version tokens, pushes and pulls against one peer endpoint.
//!
//! Public methods never return errors. Transport, status and format problems are logged here,
//! next to where they happen, and degrade to an unknown token, a failed push or an empty batch.

use edgesync_types::protocol::{DataPayload, GET_TOKEN_PATH, RECEIVE_DATA_PATH, SEND_DATA_PATH};
use edgesync_types::{RecordBatch, Table, VersionToken};
use serde_json::Value;
use std::time::Duration;

use crate::error::TransferError;

#[derive(Clone)]
pub struct PeerClient {
    http: reqwest::Client,
}

impl PeerClient {
    /// Client whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransferError> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(TransferError::Client)?;
        Ok(Self { http })
    }

    /// Peer's version token, `None` when it cannot be obtained.
    pub async fn token(&self, endpoint: &str) -> Option<VersionToken> {
        match self.fetch_token(endpoint).await {
            Ok(token) => {
                tracing::info!("[Transfer] Peer token retrieved from {}: {}", endpoint, token);
                Some(token)
            }
            Err(e) => {
                tracing::error!("[Transfer] Could not read token of {}: {}", endpoint, e);
                None
            }
        }
    }

    /// Send a batch to the peer's ingest endpoint. `true` only on a 2xx answer.
    pub async fn push(&self, endpoint: &str, batch: &RecordBatch) -> bool {
        let table = batch.table();
        match self.send_batch(endpoint, batch).await {
            Ok(status) => {
                tracing::info!(
                    "[Transfer] Sent {} record(s) to {} for table '{}' ({})",
                    batch.len(),
                    endpoint,
                    table,
                    status
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    "[Transfer] Failed to send data to {} for table '{}': {}",
                    endpoint,
                    table,
                    e
                );
                false
            }
        }
    }

    /// Fetch the peer's rows of `table`. Every failure yields an empty batch.
    pub async fn pull(&self, endpoint: &str, table: Table) -> RecordBatch {
        let values = match self.fetch_records(endpoint, table).await {
            Ok(values) => values,
            Err(e) => {
                tracing::error!(
                    "[Transfer] Failed to retrieve data from {} for table '{}': {}",
                    endpoint,
                    table,
                    e
                );
                return RecordBatch::empty(table);
            }
        };

        if values.is_empty() {
            tracing::warn!("[Transfer] No data received from {} for table '{}'", endpoint, table);
            return RecordBatch::empty(table);
        }

        match RecordBatch::from_json(table, values) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!("[Transfer] Discarding data from {}: {}", endpoint, e);
                RecordBatch::empty(table)
            }
        }
    }

    async fn fetch_token(&self, endpoint: &str) -> Result<VersionToken, TransferError> {
        let url = endpoint_url(endpoint, GET_TOKEN_PATH);
        let body = self.get_json(&url).await?;
        body.get("token")
            .and_then(VersionToken::from_json)
            .ok_or(TransferError::MissingField { url, field: "token" })
    }

    async fn send_batch(
        &self,
        endpoint: &str,
        batch: &RecordBatch,
    ) -> Result<reqwest::StatusCode, TransferError> {
        let url = endpoint_url(endpoint, &format!("{}/{}", RECEIVE_DATA_PATH, batch.table()));
        let payload = DataPayload::new(batch.to_json()?);
        tracing::debug!("[Transfer] Sending {} record(s) to {}", payload.data.len(), url);

        let resp = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TransferError::from_reqwest(&url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransferError::Status { url, status });
        }
        Ok(status)
    }

    /// `data` absent or null reads as an empty list; any other non-list is a format error.
    async fn fetch_records(&self, endpoint: &str, table: Table) -> Result<Vec<Value>, TransferError> {
        let url = endpoint_url(endpoint, &format!("{}/{}", SEND_DATA_PATH, table));
        match self.get_json(&url).await? {
            Value::Object(mut body) => match body.remove("data") {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(Value::Array(values)) => Ok(values),
                Some(_) => Err(TransferError::MissingField { url, field: "data" }),
            },
            _ => Err(TransferError::MissingField { url, field: "data" }),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, TransferError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TransferError::from_reqwest(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransferError::Status { url: url.to_string(), status });
        }

        let bytes = resp.bytes().await.map_err(|e| TransferError::from_reqwest(url, e))?;
        serde_json::from_slice(&bytes)
            .map_err(|source| TransferError::Format { url: url.to_string(), source })
    }
}

fn endpoint_url(endpoint: &str, path: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), path)
}
