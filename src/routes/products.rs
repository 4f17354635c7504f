//! Product CRUD routes.

use crate::handlers::products::{create_product, delete_product, list_products, update_product};
use crate::state::AppState;
use axum::{routing::get, routing::put, Router};

pub fn product_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/:product_id",
            put(update_product).delete(delete_product),
        )
        .with_state(state)
}
