//! Response bodies and status helpers shared by the handlers.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Fixed acknowledgment returned by delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub message: String,
}

impl DeleteAck {
    pub fn new(label: &str) -> Self {
        Self {
            message: format!("{label} deleted successfully"),
        }
    }
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}
