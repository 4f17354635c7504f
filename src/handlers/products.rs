//! Product CRUD handlers: list, create, update, delete.

use crate::error::AppError;
use crate::response::{created, ok};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::instrument;

/// Body rejections keep their size-limit status; everything else is a 400.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(v)| v).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })
}

// GET /api/products
#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = state.products.list().await?;
    tracing::debug!(count = rows.len(), "listed products");
    Ok(ok(rows))
}

// POST /api/products
#[instrument(skip(state, body))]
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.validator.validate(&json_body(body)?)?;
    let row = state.products.create(&product).await?;
    Ok(created(row))
}

// PUT /api/products/:product_id
#[instrument(skip(state, body))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.validator.validate(&json_body(body)?)?;
    let row = state.products.update(&product_id, &product).await?;
    Ok(ok(row))
}

// DELETE /api/products/:product_id
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ack = state.products.delete(&product_id).await?;
    Ok(ok(ack))
}
