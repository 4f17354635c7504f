//! Hosted table API client (PostgREST dialect, as served by Supabase).

use super::{rows_from_value, Filter, TableClient};
use crate::error::BackendError;
use crate::model::Record;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;

const REST_PREFIX: &str = "rest/v1";

pub struct RestTableClient {
    client: reqwest::Client,
    base_url: String,
    key: SecretString,
    timeout: Duration,
}

impl RestTableClient {
    /// `url` is the project URL (e.g. `https://xyz.supabase.co`); the REST
    /// prefix is appended here.
    pub fn new(url: &str, key: SecretString, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/{}", url.trim_end_matches('/'), REST_PREFIX),
            key,
            timeout,
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let key = self.key.expose_secret();
        self.client
            .request(method, format!("{}/{}", self.base_url, table))
            .header("apikey", key)
            .bearer_auth(key)
    }

    fn returning(builder: RequestBuilder) -> RequestBuilder {
        builder.header("Prefer", "return=representation")
    }

    fn filtered(builder: RequestBuilder, filter: &Filter) -> RequestBuilder {
        builder.query(&[(filter.column.as_str(), format!("eq.{}", filter.value_text()))])
    }

    /// A client-side timeout is the same failure as the gateway's own call
    /// timeout, so it is reported as one.
    fn transport(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout(self.timeout)
        } else {
            err.into()
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Vec<Record>, BackendError> {
        let response = builder.send().await.map_err(|e| self.transport(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport(e))?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &body),
            });
        }
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value: Value =
            serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))?;
        rows_from_value(value)
    }
}

/// The hosted API reports failures as `{"message": ..., "code": ..., ...}`.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(msg)) = obj.get("message").or_else(|| obj.get("error")) {
            return msg.clone();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("backend responded with HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl TableClient for RestTableClient {
    async fn select_all(&self, table: &str) -> Result<Vec<Record>, BackendError> {
        tracing::debug!(table, "rest select *");
        let builder = self.request(Method::GET, table).query(&[("select", "*")]);
        self.send(builder).await
    }

    async fn insert(&self, table: &str, record: &Record) -> Result<Vec<Record>, BackendError> {
        tracing::debug!(table, "rest insert");
        let builder = Self::returning(self.request(Method::POST, table)).json(record);
        self.send(builder).await
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        record: &Record,
    ) -> Result<Vec<Record>, BackendError> {
        tracing::debug!(table, column = %filter.column, "rest update");
        let builder = Self::filtered(Self::returning(self.request(Method::PATCH, table)), filter)
            .json(record);
        self.send(builder).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, BackendError> {
        tracing::debug!(table, column = %filter.column, "rest delete");
        let builder = Self::filtered(Self::returning(self.request(Method::DELETE, table)), filter);
        self.send(builder).await
    }
}
