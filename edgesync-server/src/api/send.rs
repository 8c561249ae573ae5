use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use edgesync_types::protocol::{DataPayload, ErrorResponse, MessageResponse};
use edgesync_types::Table;

use super::{INVALID_TABLE, UNEXPECTED_ERROR};
use crate::state::AppState;

/// `GET /send_data/{table}`: every row of the table, volatile columns excluded.
pub async fn send_data(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> impl IntoResponse {
    let Some(table) = Table::from_wire(&table) else {
        tracing::error!("[Api] Invalid table: {}", table);
        return (StatusCode::BAD_REQUEST, Json(MessageResponse::new(INVALID_TABLE))).into_response();
    };

    let rows = state
        .store()
        .fetch(table, None)
        .await
        .map_err(|e| e.to_string())
        .and_then(|batch| batch.to_json().map_err(|e| e.to_string()));

    match rows {
        Ok(data) => {
            tracing::info!("[Api] Serving {} '{}' record(s)", data.len(), table);
            (StatusCode::OK, Json(DataPayload::new(data))).into_response()
        }
        Err(e) => {
            tracing::error!("[Api] Failed to read '{}': {}", table, e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(UNEXPECTED_ERROR)))
                .into_response()
        }
    }
}
