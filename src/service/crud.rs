//! Generic CRUD over one backend table: one remote call per operation, no
//! retries, backend failures mapped 1:1 into [`AppError`].

use crate::backend::{Filter, TableClient};
use crate::config::{GatewayConfig, DEFAULT_CALL_TIMEOUT};
use crate::error::{AppError, BackendError};
use crate::model::{Record, Resource};
use crate::response::DeleteAck;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct GatewayOptions {
    pub table: String,
    pub id_column: String,
    pub call_timeout: Duration,
    pub strict_delete: bool,
    pub expose_backend_errors: bool,
}

impl GatewayOptions {
    /// Defaults for resource `R`: its own collection and id column.
    pub fn for_resource<R: Resource>() -> Self {
        Self {
            table: R::COLLECTION.to_string(),
            id_column: R::ID_COLUMN.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            strict_delete: false,
            expose_backend_errors: true,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            table: config.table.clone(),
            id_column: config.id_column.clone(),
            call_timeout: config.call_timeout,
            strict_delete: config.strict_delete,
            expose_backend_errors: config.expose_backend_errors,
        }
    }
}

pub struct CrudGateway<R> {
    client: Arc<dyn TableClient>,
    options: GatewayOptions,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> CrudGateway<R> {
    pub fn new(client: Arc<dyn TableClient>, options: GatewayOptions) -> Self {
        Self {
            client,
            options,
            _resource: PhantomData,
        }
    }

    /// All stored rows, in the order the backend returned them.
    pub async fn list(&self) -> Result<Vec<Record>, AppError> {
        self.call("list", self.client.select_all(&self.options.table))
            .await
    }

    /// Insert `item`; returns the first row the backend reports as created.
    pub async fn create(&self, item: &R) -> Result<Record, AppError> {
        let record = to_record(item)?;
        let rows = self
            .call("create", self.client.insert(&self.options.table, &record))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| self.backend_failure("create", BackendError::EmptyResult("insert")))
    }

    /// Replace the whole stored document of `id` with `item`.
    pub async fn update(&self, id: &str, item: &R) -> Result<Record, AppError> {
        let record = to_record(item)?;
        let filter = self.id_filter(id);
        let rows = self
            .call(
                "update",
                self.client.update(&self.options.table, &filter, &record),
            )
            .await?;
        rows.into_iter().next().ok_or_else(|| {
            tracing::warn!(table = %self.options.table, id, "update matched no row");
            AppError::NotFound(format!("{} '{}' not found", R::LABEL, id))
        })
    }

    /// Delete `id`. The acknowledgment is the same whether or not a row matched,
    /// unless strict deletes are configured.
    pub async fn delete(&self, id: &str) -> Result<DeleteAck, AppError> {
        let filter = self.id_filter(id);
        let rows = self
            .call("delete", self.client.delete(&self.options.table, &filter))
            .await?;
        if rows.is_empty() {
            if self.options.strict_delete {
                return Err(AppError::NotFound(format!("{} '{}' not found", R::LABEL, id)));
            }
            tracing::debug!(table = %self.options.table, id, "delete matched no row");
        }
        Ok(DeleteAck::new(R::LABEL))
    }

    fn id_filter(&self, id: &str) -> Filter {
        Filter::eq(self.options.id_column.clone(), id)
    }

    async fn call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        let result = match tokio::time::timeout(self.options.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(self.options.call_timeout)),
        };
        result.map_err(|err| self.backend_failure(operation, err))
    }

    fn backend_failure(&self, operation: &'static str, err: BackendError) -> AppError {
        tracing::error!(table = %self.options.table, operation, error = %err, "backend call failed");
        if self.options.expose_backend_errors {
            AppError::Backend(err)
        } else {
            AppError::Backend(BackendError::Redacted)
        }
    }
}

fn to_record<R: Resource>(item: &R) -> Result<Record, AppError> {
    match serde_json::to_value(item) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::BadRequest(format!(
            "{} must serialize to an object",
            R::LABEL
        ))),
        Err(e) => Err(AppError::BadRequest(e.to_string())),
    }
}
