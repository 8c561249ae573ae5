use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Json};
use edgesync_types::protocol::{ErrorResponse, TokenResponse};

use super::{NO_DATA_FOUND, UNEXPECTED_ERROR};
use crate::state::AppState;

/// `GET /get_token`: this node's version token.
pub async fn get_token(State(state): State<AppState>) -> impl IntoResponse {
    match state.store().current_token().await {
        Ok(Some(token)) => {
            (StatusCode::OK, Json(TokenResponse { token: token.get() })).into_response()
        }
        Ok(None) => {
            tracing::warn!("[Api] Token requested but none is stored");
            (StatusCode::NOT_FOUND, Json(ErrorResponse::new(NO_DATA_FOUND))).into_response()
        }
        Err(e) => {
            tracing::error!("[Api] Error retrieving token: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(UNEXPECTED_ERROR)))
                .into_response()
        }
    }
}
