//! Table clients: the seam between the gateway and the hosted store.

mod memory;
mod postgres;
mod rest;

pub use memory::MemoryTable;
pub use postgres::PgTableClient;
pub use rest::RestTableClient;

use crate::config::{BackendConfig, GatewayConfig};
use crate::error::BackendError;
use crate::model::Record;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use std::sync::Arc;

/// Row filter: `column = value`.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Filter value rendered as text, the way both the REST query string and
    /// the `::text` comparison in SQL see it.
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Table-oriented backend. Every call returns the rows it matched or touched.
#[async_trait]
pub trait TableClient: Send + Sync {
    async fn select_all(&self, table: &str) -> Result<Vec<Record>, BackendError>;

    async fn insert(&self, table: &str, record: &Record) -> Result<Vec<Record>, BackendError>;

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        record: &Record,
    ) -> Result<Vec<Record>, BackendError>;

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, BackendError>;
}

/// Build the client selected by configuration. Postgres connects eagerly so a
/// bad database URL stops startup.
pub async fn connect(config: &GatewayConfig) -> Result<Arc<dyn TableClient>, BackendError> {
    match &config.backend {
        BackendConfig::Rest { url, key } => {
            let client = RestTableClient::new(url, key.clone(), config.call_timeout)?;
            Ok(Arc::new(client))
        }
        BackendConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let client = PgTableClient::connect(database_url.expose_secret(), *max_connections).await?;
            Ok(Arc::new(client))
        }
    }
}

pub(crate) fn rows_from_value(value: Value) -> Result<Vec<Record>, BackendError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(BackendError::Decode(format!("expected row object, got {other}"))),
            })
            .collect(),
        Value::Object(map) => Ok(vec![map]),
        Value::Null => Ok(Vec::new()),
        other => Err(BackendError::Decode(format!("expected row array, got {other}"))),
    }
}
