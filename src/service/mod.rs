//! Schema validation and the CRUD gateway.

mod crud;
mod validation;
pub use crud::{CrudGateway, GatewayOptions};
pub use validation::ProductValidator;
