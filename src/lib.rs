//! Products gateway: a typed CRUD façade over a hosted products table.

pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;

pub use backend::{connect, Filter, MemoryTable, PgTableClient, RestTableClient, TableClient};
pub use config::{BackendConfig, CorsConfig, GatewayConfig, ValidationRules};
pub use error::{AppError, BackendError, ConfigError, FieldError};
pub use model::{Product, Record, Resource};
pub use response::DeleteAck;
pub use routes::{build_app, common_routes, product_routes};
pub use service::{CrudGateway, GatewayOptions, ProductValidator};
pub use state::AppState;
