//! Startup checks: anything that would only fail later at request time is
//! rejected here instead.

use crate::config::{BackendConfig, CorsConfig, GatewayConfig};
use crate::error::ConfigError;
use axum::http::HeaderValue;
use regex::Regex;
use secrecy::ExposeSecret;

/// Plain SQL/REST identifier: letters, digits, underscore; not starting with a digit.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn validate(config: &GatewayConfig) -> Result<(), ConfigError> {
    match &config.backend {
        BackendConfig::Rest { url, key } => {
            let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::Invalid {
                key: "BACKEND_URL",
                reason: e.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid {
                    key: "BACKEND_URL",
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                });
            }
            if key.expose_secret().trim().is_empty() {
                return Err(ConfigError::Missing("BACKEND_KEY"));
            }
        }
        BackendConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let url = database_url.expose_secret();
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(ConfigError::Invalid {
                    key: "DATABASE_URL",
                    reason: "expected a postgres:// URL".into(),
                });
            }
            if *max_connections == 0 {
                return Err(ConfigError::Invalid {
                    key: "DATABASE_MAX_CONNECTIONS",
                    reason: "must be at least 1".into(),
                });
            }
        }
    }

    if !is_identifier(&config.table) {
        return Err(ConfigError::Invalid {
            key: "PRODUCTS_TABLE",
            reason: format!("'{}' is not a plain identifier", config.table),
        });
    }
    if !is_identifier(&config.id_column) {
        return Err(ConfigError::Invalid {
            key: "PRODUCTS_ID_COLUMN",
            reason: format!("'{}' is not a plain identifier", config.id_column),
        });
    }
    if config.call_timeout.is_zero() {
        return Err(ConfigError::Invalid {
            key: "BACKEND_TIMEOUT_SECS",
            reason: "must be greater than zero".into(),
        });
    }
    if config.body_limit_bytes == 0 {
        return Err(ConfigError::Invalid {
            key: "BODY_LIMIT_BYTES",
            reason: "must be greater than zero".into(),
        });
    }
    if let Some(pattern) = &config.rules.ean_pattern {
        Regex::new(pattern).map_err(|e| ConfigError::Invalid {
            key: "EAN_PATTERN",
            reason: e.to_string(),
        })?;
    }
    if let CorsConfig::AllowOrigins(origins) = &config.cors {
        if origins.is_empty() {
            return Err(ConfigError::Invalid {
                key: "CORS_ALLOW_ORIGINS",
                reason: "no origins listed".into(),
            });
        }
        for origin in origins {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::Invalid {
                key: "CORS_ALLOW_ORIGINS",
                reason: format!("'{origin}' is not a valid origin"),
            })?;
        }
    }
    Ok(())
}
