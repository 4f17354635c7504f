//! Shared application state. Built once at startup and never mutated.

use crate::backend::TableClient;
use crate::config::GatewayConfig;
use crate::error::ConfigError;
use crate::model::Product;
use crate::service::{CrudGateway, GatewayOptions, ProductValidator};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<CrudGateway<Product>>,
    pub validator: Arc<ProductValidator>,
}

impl AppState {
    pub fn new(products: CrudGateway<Product>, validator: ProductValidator) -> Self {
        Self {
            products: Arc::new(products),
            validator: Arc::new(validator),
        }
    }

    /// Wire the gateway and validator for `config` around an existing client.
    pub fn from_config(
        client: Arc<dyn TableClient>,
        config: &GatewayConfig,
    ) -> Result<Self, ConfigError> {
        let validator = ProductValidator::new(&config.rules)?;
        let gateway = CrudGateway::new(client, GatewayOptions::from_config(config));
        Ok(Self::new(gateway, validator))
    }
}
