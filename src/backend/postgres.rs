//! Direct PostgreSQL access to the same table. Rows travel as JSONB both ways
//! so the column types stay defined by the database schema.

use super::{rows_from_value, Filter, TableClient};
use crate::error::BackendError;
use crate::model::Record;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub struct PgTableClient {
    pool: PgPool,
}

impl PgTableClient {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, BackendError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Binds the record (as JSONB) first, then the filter value (as text).
    async fn fetch_rows(
        &self,
        sql: &str,
        record: Option<&Record>,
        filter: Option<&Filter>,
    ) -> Result<Vec<Record>, BackendError> {
        tracing::debug!(sql = %sql, "query");
        let mut query = sqlx::query_scalar::<_, Value>(sql);
        if let Some(record) = record {
            query = query.bind(Value::Object(record.clone()));
        }
        if let Some(filter) = filter {
            query = query.bind(filter.value_text());
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows_from_value(Value::Array(rows))
    }
}

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn column_list(record: &Record) -> Result<String, BackendError> {
    if record.is_empty() {
        return Err(BackendError::Decode("record has no columns".into()));
    }
    Ok(record.keys().map(|k| quoted(k)).collect::<Vec<_>>().join(", "))
}

fn select_all_sql(table: &str) -> String {
    format!("SELECT to_jsonb(t.*) FROM {} AS t", quoted(table))
}

fn insert_sql(table: &str, columns: &str) -> String {
    let t = quoted(table);
    format!(
        "INSERT INTO {t} AS t ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::{t}, $1) RETURNING to_jsonb(t.*)"
    )
}

fn update_sql(table: &str, columns: &str, filter_column: &str) -> String {
    let t = quoted(table);
    format!(
        "UPDATE {t} AS t SET ({columns}) = (SELECT {columns} FROM jsonb_populate_record(NULL::{t}, $1)) WHERE t.{}::text = $2 RETURNING to_jsonb(t.*)",
        quoted(filter_column)
    )
}

fn delete_sql(table: &str, filter_column: &str) -> String {
    format!(
        "DELETE FROM {} AS t WHERE t.{}::text = $1 RETURNING to_jsonb(t.*)",
        quoted(table),
        quoted(filter_column)
    )
}

#[async_trait]
impl TableClient for PgTableClient {
    async fn select_all(&self, table: &str) -> Result<Vec<Record>, BackendError> {
        self.fetch_rows(&select_all_sql(table), None, None).await
    }

    async fn insert(&self, table: &str, record: &Record) -> Result<Vec<Record>, BackendError> {
        let sql = insert_sql(table, &column_list(record)?);
        self.fetch_rows(&sql, Some(record), None).await
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        record: &Record,
    ) -> Result<Vec<Record>, BackendError> {
        let sql = update_sql(table, &column_list(record)?, &filter.column);
        self.fetch_rows(&sql, Some(record), Some(filter)).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, BackendError> {
        let sql = delete_sql(table, &filter.column);
        self.fetch_rows(&sql, None, Some(filter)).await
    }
}
