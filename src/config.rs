use std::collections::HashMap;
use std::net::SocketAddr;

use thiserror::Error;

use crate::external::financial_modeling::DEFAULT_BASE_URL;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Postgres { database_url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinanceApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub requests_per_minute: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PriceFeed {
    FinancialModelingPrep(FinanceApiConfig),
    Simulated { volatility: f64 },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub price_feed: PriceFeed,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr: SocketAddr = parse_or(get("BIND_ADDR"), "BIND_ADDR", "0.0.0.0:3000".parse().ok())?;

        let store = match get("STORE_BACKEND").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("postgres") => StoreBackend::Postgres {
                database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_or(get("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", Some(10))?,
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let price_feed = match get("PRICE_PROVIDER").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("financialmodelingprep") | Some("fmp") => {
                PriceFeed::FinancialModelingPrep(FinanceApiConfig {
                    api_key: get("FINANCE_API_KEY").ok_or(ConfigError::Missing("FINANCE_API_KEY"))?,
                    base_url: get("FINANCE_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                    requests_per_minute: parse_or(
                        get("FINANCE_API_REQUESTS_PER_MINUTE"),
                        "FINANCE_API_REQUESTS_PER_MINUTE",
                        Some(60),
                    )?,
                })
            }
            Some("simulated") => PriceFeed::Simulated {
                volatility: parse_or(get("SIMULATED_VOLATILITY"), "SIMULATED_VOLATILITY", Some(0.01))?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "PRICE_PROVIDER",
                    value: other.to_string(),
                })
            }
        };

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                value: "must be at least 32 bytes".to_string(),
            });
        }

        let session_ttl_hours: i64 = parse_or(get("SESSION_TTL_HOURS"), "SESSION_TTL_HOURS", Some(12))?;
        if session_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_HOURS",
                value: session_ttl_hours.to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            store,
            price_feed,
            jwt_secret,
            session_ttl_hours,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => default.ok_or(ConfigError::Missing(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults_to_postgres_and_fmp() {
        let config = AppConfig::from_vars(vars(&[
            ("DATABASE_URL", "postgres://localhost/stock_trader"),
            ("FINANCE_API_KEY", "demo"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(
            config.store,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/stock_trader".into(),
                max_connections: 10,
            }
        );
        match config.price_feed {
            PriceFeed::FinancialModelingPrep(api) => {
                assert_eq!(api.base_url, DEFAULT_BASE_URL);
                assert_eq!(api.requests_per_minute, 60);
            }
            other => panic!("unexpected feed {:?}", other),
        }
        assert_eq!(config.session_ttl_hours, 12);
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let err = AppConfig::from_vars(vars(&[("STORE_BACKEND", "memory"), ("JWT_SECRET", SECRET)])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("FINANCE_API_KEY"));
    }

    #[test]
    fn test_memory_backend_with_simulated_feed() {
        let config = AppConfig::from_vars(vars(&[
            ("STORE_BACKEND", "memory"),
            ("PRICE_PROVIDER", "simulated"),
            ("SIMULATED_VOLATILITY", "0"),
            ("JWT_SECRET", SECRET),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();

        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.price_feed, PriceFeed::Simulated { volatility: 0.0 });
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_rejects_short_secret_and_bad_numbers() {
        let short = AppConfig::from_vars(vars(&[
            ("STORE_BACKEND", "memory"),
            ("PRICE_PROVIDER", "simulated"),
            ("JWT_SECRET", "short"),
        ]));
        assert!(matches!(short, Err(ConfigError::Invalid { key: "JWT_SECRET", .. })));

        let bad_ttl = AppConfig::from_vars(vars(&[
            ("STORE_BACKEND", "memory"),
            ("PRICE_PROVIDER", "simulated"),
            ("JWT_SECRET", SECRET),
            ("SESSION_TTL_HOURS", "soon"),
        ]));
        assert!(matches!(bad_ttl, Err(ConfigError::Invalid { key: "SESSION_TTL_HOURS", .. })));
    }
}
