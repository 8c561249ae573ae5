//! JSON bodies exchanged between the coordinator and its peers.
//!
//! | Endpoint | Body |
//! |---|---|
//! | `POST /receive_data/{table}` | [`DataPayload`] in, [`MessageResponse`] out |
//! | `GET /send_data/{table}` | [`DataPayload`] out |
//! | `GET /get_token` | [`TokenResponse`] or [`ErrorResponse`] out |

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RECEIVE_DATA_PATH: &str = "receive_data";
pub const SEND_DATA_PATH: &str = "send_data";
pub const GET_TOKEN_PATH: &str = "get_token";

/// Batch of wire records for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPayload {
    #[serde(default)]
    pub data: Vec<Value>,
}

impl DataPayload {
    pub fn new(data: Vec<Value>) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
