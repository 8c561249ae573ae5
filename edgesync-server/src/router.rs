use axum::{
    body::Body,
    http::{header, Response, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::api;
use crate::state::AppState;
use edgesync_types::protocol::{ErrorResponse, MessageResponse};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/receive_data/:table",
            post(api::receive_data).layer(CatchPanicLayer::custom(receive_panic)),
        )
        .route(
            "/get_token",
            get(api::get_token).layer(CatchPanicLayer::custom(error_panic)),
        )
        .route(
            "/send_data/:table",
            get(api::send_data).layer(CatchPanicLayer::custom(error_panic)),
        )
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, axum::Json(serde_json::json!({"status": "ok"})))
}

fn receive_panic(_: Box<dyn Any + Send + 'static>) -> Response<Body> {
    tracing::error!("[Api] Handler panicked while receiving data");
    json_500(serde_json::to_vec(&MessageResponse::new(api::SERVER_ERROR)))
}

fn error_panic(_: Box<dyn Any + Send + 'static>) -> Response<Body> {
    tracing::error!("[Api] Handler panicked");
    json_500(serde_json::to_vec(&ErrorResponse::new(api::UNEXPECTED_ERROR)))
}

fn json_500(body: serde_json::Result<Vec<u8>>) -> Response<Body> {
    let mut response = Response::new(Body::from(body.unwrap_or_default()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::test_app_state;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_health() {
        let (state, _tmp) = test_app_state().await;
        let server = TestServer::new(build_router(state)).unwrap();
        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (state, _tmp) = test_app_state().await;
        let server = TestServer::new(build_router(state)).unwrap();
        server.get("/receive_data/modem").await.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        server.get("/nope").await.assert_status_not_found();
    }
}
