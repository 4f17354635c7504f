//! In-process table used by tests and local demos. Behaves like the hosted
//! store where the gateway can observe it: ids and `created_at` are assigned on
//! insert, every call returns the affected rows.

use super::{Filter, TableClient};
use crate::error::BackendError;
use crate::model::Record;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct MemoryTable {
    id_column: String,
    tables: Mutex<HashMap<String, Vec<Record>>>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::with_id_column("id")
    }

    pub fn with_id_column(id_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
            tables: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every following call fail with `message` until cleared with `None`.
    pub fn fail_with(&self, message: Option<&str>) {
        *lock(&self.failure) = message.map(str::to_string);
    }

    /// Number of table calls served so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Current rows of `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Record> {
        lock(&self.tables).get(table).cloned().unwrap_or_default()
    }

    fn begin(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.failure).as_ref() {
            Some(message) => Err(BackendError::Status {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn matches(row: &Record, filter: &Filter) -> bool {
    match row.get(&filter.column) {
        Some(Value::String(s)) => *s == filter.value_text(),
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == filter.value_text(),
    }
}

#[async_trait]
impl TableClient for MemoryTable {
    async fn select_all(&self, table: &str) -> Result<Vec<Record>, BackendError> {
        self.begin()?;
        Ok(self.rows(table))
    }

    async fn insert(&self, table: &str, record: &Record) -> Result<Vec<Record>, BackendError> {
        self.begin()?;
        let mut row = record.clone();
        if !row.contains_key(&self.id_column) {
            row.insert(
                self.id_column.clone(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }
        row.entry("created_at")
            .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));
        lock(&self.tables)
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(vec![row])
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        record: &Record,
    ) -> Result<Vec<Record>, BackendError> {
        self.begin()?;
        let mut tables = lock(&self.tables);
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|row| matches(row, filter)) {
            for (k, v) in record {
                row.insert(k.clone(), v.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, BackendError> {
        self.begin()?;
        let mut tables = lock(&self.tables);
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let (removed, kept): (Vec<Record>, Vec<Record>) =
            rows.drain(..).partition(|row| matches(row, filter));
        *rows = kept;
        Ok(removed)
    }
}
