use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use edgesync_types::protocol::MessageResponse;
use edgesync_types::{RecordBatch, Table};
use serde_json::Value;

use super::{INSERT_FAILED, INVALID_DATA_FORMAT, INVALID_RECORD, INVALID_TABLE, NO_DATA};
use crate::state::AppState;

type Reply = (StatusCode, Json<MessageResponse>);

fn reply(status: StatusCode, message: impl Into<String>) -> Reply {
    (status, Json(MessageResponse::new(message)))
}

/// `POST /receive_data/{table}`: merge a peer's batch into the local store.
///
/// Every validation failure is answered before the store is touched.
pub async fn receive_data(
    State(state): State<AppState>,
    Path(table): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Reply {
    let Some(table) = Table::from_wire(&table) else {
        tracing::error!("[Api] Invalid table: {}", table);
        return reply(StatusCode::BAD_REQUEST, INVALID_TABLE);
    };

    let values = match body {
        Ok(Json(body)) => match extract_data(body) {
            Some(values) => values,
            None => {
                tracing::error!("[Api] Data payload is not a list");
                return reply(StatusCode::BAD_REQUEST, INVALID_DATA_FORMAT);
            }
        },
        Err(rejection) => {
            tracing::error!("[Api] Unreadable body for '{}': {}", table, rejection);
            return reply(StatusCode::BAD_REQUEST, INVALID_DATA_FORMAT);
        }
    };

    if values.is_empty() {
        tracing::warn!("[Api] No data received for '{}'", table);
        return reply(StatusCode::BAD_REQUEST, NO_DATA);
    }

    let batch = match RecordBatch::from_json(table, values) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!("[Api] {}", e);
            return reply(StatusCode::BAD_REQUEST, INVALID_RECORD);
        }
    };

    match state.store().merge_write(&batch).await {
        Ok(count) => {
            tracing::info!("[Api] Stored {} record(s) into '{}'", count, table.store_name());
            reply(
                StatusCode::OK,
                format!("Data successfully inserted into '{}'.", table.store_name()),
            )
        }
        Err(e) if e.is_empty_batch() => reply(StatusCode::BAD_REQUEST, NO_DATA),
        Err(e) => {
            tracing::error!("[Api] Failed to store '{}': {}", table.store_name(), e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, INSERT_FAILED)
        }
    }
}

/// The `data` list of the body. A missing or null `data` counts as an empty list.
fn extract_data(body: Value) -> Option<Vec<Value>> {
    let Value::Object(mut body) = body else {
        return None;
    };
    match body.remove("data") {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::Array(values)) => Some(values),
        Some(_) => None,
    }
}
