//! Runtime configuration types.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_TABLE: &str = "products";
pub const DEFAULT_ID_COLUMN: &str = "id";
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Where product rows live.
#[derive(Clone, Debug)]
pub enum BackendConfig {
    /// Hosted table API reached over HTTPS with an access key.
    Rest { url: String, key: SecretString },
    /// Direct connection to the database behind the hosted API.
    Postgres {
        database_url: SecretString,
        max_connections: u32,
    },
}

/// Cross-origin policy applied to every route.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// No CORS headers; browsers enforce same-origin.
    #[default]
    Disabled,
    /// Any origin, method and header. Removes browser-side origin protection.
    AllowAll,
    AllowOrigins(Vec<String>),
}

/// Opt-in product rules stricter than the baseline type checks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Regex the whole `ean_code` must match (e.g. `^\d{13}$`).
    #[serde(default)]
    pub ean_pattern: Option<String>,
    #[serde(default)]
    pub allowed_statuses: Option<Vec<String>>,
    /// Reject negative `price`, `amazon_price` and `list_price`.
    #[serde(default)]
    pub non_negative_prices: bool,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub backend: BackendConfig,
    pub table: String,
    pub id_column: String,
    /// Upper bound on a single backend call. One failure, no retry.
    pub call_timeout: Duration,
    /// Report `404` when a delete matched no row instead of the fixed acknowledgment.
    pub strict_delete: bool,
    /// Return the backend's own error text to callers. When off, callers get a
    /// generic message and the original is only logged.
    pub expose_backend_errors: bool,
    pub body_limit_bytes: usize,
    pub cors: CorsConfig,
    pub rules: ValidationRules,
}
