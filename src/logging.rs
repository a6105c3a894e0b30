use std::collections::HashMap;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub type LoggingResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_vars(&std::env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).cloned().filter(|v| !v.trim().is_empty());

        Self {
            loki_enabled: get("LOKI_ENABLED")
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            loki_url: get("LOKI_URL"),
            service_name: get("SERVICE_NAME").unwrap_or_else(|| "stock-trader".to_string()),
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_level: get("RUST_LOG").unwrap_or_else(|| "info,sqlx=warn".to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err("LOKI_ENABLED is true but LOKI_URL is not set".to_string());
        }
        Ok(())
    }
}

/// Installs the global subscriber: console always, Loki when enabled and
/// compiled in. Must be called from inside the tokio runtime.
pub fn init_logging(config: LoggingConfig) -> LoggingResult {
    config.validate()?;

    #[cfg(feature = "loki")]
    {
        if config.loki_enabled {
            if let Some(loki_url) = config.loki_url.clone() {
                return init_with_loki(config, &loki_url);
            }
        }
    }

    #[cfg(not(feature = "loki"))]
    {
        if config.loki_enabled {
            eprintln!("LOKI_ENABLED is set but the binary was built without the `loki` feature");
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::info!("📊 Console logging for {} ({})", config.service_name, config.environment);
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(config: LoggingConfig, loki_url: &str) -> LoggingResult {
    let url = url::Url::parse(loki_url)?;

    let (loki_layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url)?;

    // Ships buffered events to Loki.
    tokio::spawn(task);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .with(loki_layer)
        .try_init()?;

    tracing::info!("📊 Logging to console and Loki at {}", loki_url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_vars(&HashMap::new());

        assert!(!config.loki_enabled);
        assert_eq!(config.service_name, "stock-trader");
        assert_eq!(config.environment, "development");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_loki_requires_url() {
        let vars = HashMap::from([("LOKI_ENABLED".to_string(), "true".to_string())]);
        let config = LoggingConfig::from_vars(&vars);

        assert!(config.loki_enabled);
        assert!(config.validate().is_err());
    }
}
