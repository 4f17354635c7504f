//! Load configuration from the process environment (or any key lookup).

use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use secrecy::SecretString;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;

impl GatewayConfig {
    /// Read from `std::env`. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse and validate from `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend = match get("BACKEND_KIND").as_deref().unwrap_or("rest") {
            "rest" => BackendConfig::Rest {
                url: get("BACKEND_URL")
                    .or_else(|| get("SUPABASE_URL"))
                    .ok_or(ConfigError::Missing("BACKEND_URL"))?,
                key: SecretString::from(
                    get("BACKEND_KEY")
                        .or_else(|| get("SUPABASE_KEY"))
                        .ok_or(ConfigError::Missing("BACKEND_KEY"))?,
                ),
            },
            "postgres" => BackendConfig::Postgres {
                database_url: SecretString::from(
                    get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                ),
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    get("DATABASE_MAX_CONNECTIONS"),
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "BACKEND_KIND",
                    reason: format!("expected 'rest' or 'postgres', got '{other}'"),
                })
            }
        };

        let host: IpAddr = parse_or("HOST", get("HOST"), IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port: u16 = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;

        let rules = ValidationRules {
            ean_pattern: get("EAN_PATTERN"),
            allowed_statuses: get("ALLOWED_STATUSES").map(|s| split_list(&s)),
            non_negative_prices: parse_bool("NON_NEGATIVE_PRICES", get("NON_NEGATIVE_PRICES"), false)?,
        };

        let config = GatewayConfig {
            bind_addr: SocketAddr::new(host, port),
            backend,
            table: get("PRODUCTS_TABLE").unwrap_or_else(|| DEFAULT_TABLE.into()),
            id_column: get("PRODUCTS_ID_COLUMN").unwrap_or_else(|| DEFAULT_ID_COLUMN.into()),
            call_timeout: Duration::from_secs(parse_or(
                "BACKEND_TIMEOUT_SECS",
                get("BACKEND_TIMEOUT_SECS"),
                DEFAULT_CALL_TIMEOUT.as_secs(),
            )?),
            strict_delete: parse_bool("STRICT_DELETE", get("STRICT_DELETE"), false)?,
            expose_backend_errors: parse_bool(
                "EXPOSE_BACKEND_ERRORS",
                get("EXPOSE_BACKEND_ERRORS"),
                true,
            )?,
            body_limit_bytes: parse_or(
                "BODY_LIMIT_BYTES",
                get("BODY_LIMIT_BYTES"),
                DEFAULT_BODY_LIMIT_BYTES,
            )?,
            cors: parse_cors(get("CORS_ALLOW_ORIGINS")),
            rules,
        };
        validate(&config)?;
        Ok(config)
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: format!("'{s}': {e}"),
        }),
    }
}

fn parse_bool(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(s) = raw else {
        return Ok(default);
    };
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            reason: format!("'{s}' is not a boolean"),
        }),
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_cors(raw: Option<String>) -> CorsConfig {
    match raw {
        None => CorsConfig::Disabled,
        Some(s) if s == "*" => CorsConfig::AllowAll,
        Some(s) => CorsConfig::AllowOrigins(split_list(&s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        GatewayConfig::from_lookup(|k| vars.get(k).cloned())
    }

    const REST: &[(&str, &str)] = &[
        ("BACKEND_URL", "https://project.supabase.co"),
        ("BACKEND_KEY", "anon"),
    ];

    #[test]
    fn rest_backend_with_defaults() {
        let config = load(REST).unwrap();
        match &config.backend {
            BackendConfig::Rest { url, key } => {
                assert_eq!(url, "https://project.supabase.co");
                assert_eq!(key.expose_secret(), "anon");
            }
            other => panic!("unexpected backend {other:?}"),
        }
        assert_eq!(config.table, "products");
        assert_eq!(config.id_column, "id");
        assert_eq!(config.call_timeout, DEFAULT_CALL_TIMEOUT);
        assert_eq!(config.bind_addr.port(), 8000);
        assert!(!config.strict_delete);
        assert!(config.expose_backend_errors);
        assert_eq!(config.cors, CorsConfig::Disabled);
        assert_eq!(config.rules, ValidationRules::default());
    }

    #[test]
    fn missing_url_or_key_fails_fast() {
        assert!(matches!(
            load(&[("BACKEND_KEY", "anon")]),
            Err(ConfigError::Missing("BACKEND_URL"))
        ));
        assert!(matches!(
            load(&[("BACKEND_URL", "https://x.supabase.co"), ("BACKEND_KEY", "  ")]),
            Err(ConfigError::Missing("BACKEND_KEY"))
        ));
    }

    #[test]
    fn legacy_supabase_names_are_accepted() {
        let config = load(&[
            ("SUPABASE_URL", "https://legacy.supabase.co"),
            ("SUPABASE_KEY", "k"),
        ])
        .unwrap();
        assert!(matches!(config.backend, BackendConfig::Rest { ref url, .. } if url == "https://legacy.supabase.co"));
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        assert!(matches!(
            load(&[("BACKEND_KIND", "postgres")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
        let config = load(&[
            ("BACKEND_KIND", "postgres"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert!(matches!(
            config.backend,
            BackendConfig::Postgres { max_connections: 12, .. }
        ));
    }

    #[test]
    fn cors_and_rules_from_env() {
        let mut vars = REST.to_vec();
        vars.extend([
            ("CORS_ALLOW_ORIGINS", "https://a.example, https://b.example"),
            ("ALLOWED_STATUSES", "active,inactive,pending"),
            ("EAN_PATTERN", r"^\d{13}$"),
            ("NON_NEGATIVE_PRICES", "yes"),
            ("STRICT_DELETE", "true"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(
            config.cors,
            CorsConfig::AllowOrigins(vec!["https://a.example".into(), "https://b.example".into()])
        );
        assert_eq!(config.rules.allowed_statuses.as_ref().map(Vec::len), Some(3));
        assert!(config.rules.non_negative_prices);
        assert!(config.strict_delete);

        let mut all = REST.to_vec();
        all.push(("CORS_ALLOW_ORIGINS", "*"));
        assert_eq!(load(&all).unwrap().cors, CorsConfig::AllowAll);
    }

    #[test]
    fn malformed_values_are_rejected() {
        for (key, value) in [
            ("PORT", "eighty"),
            ("STRICT_DELETE", "maybe"),
            ("BACKEND_KIND", "mysql"),
            ("BACKEND_TIMEOUT_SECS", "0"),
            ("PRODUCTS_TABLE", "products; drop table x"),
            ("EAN_PATTERN", "(unclosed"),
        ] {
            let mut vars = REST.to_vec();
            vars.push((key, value));
            assert!(load(&vars).is_err(), "{key}={value} should be rejected");
        }
    }
}
