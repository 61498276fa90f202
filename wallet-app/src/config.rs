//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use wallet_hex::outbound::gateways::{DEFAULT_GATEWAY_A_URL, DEFAULT_GATEWAY_B_URL};

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub gateway_a_url: String,
    pub gateway_b_url: String,
    pub request_timeout: Duration,
    /// OTLP collector; spans are only exported when this is set.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let gateway_a_url =
            lookup("GATEWAY_A_CHECKOUT_URL").unwrap_or_else(|| DEFAULT_GATEWAY_A_URL.to_string());
        let gateway_b_url =
            lookup("GATEWAY_B_CHECKOUT_URL").unwrap_or_else(|| DEFAULT_GATEWAY_B_URL.to_string());

        let timeout_secs: u64 = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid REQUEST_TIMEOUT_SECS: {}", e))?;
        if timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        let otlp_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.is_empty());

        Ok(Self {
            port,
            database_url,
            gateway_a_url,
            gateway_b_url,
            request_timeout: Duration::from_secs(timeout_secs),
            otlp_endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "sqlite://wallet.db")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.gateway_a_url, DEFAULT_GATEWAY_A_URL);
        assert_eq!(config.gateway_b_url, DEFAULT_GATEWAY_B_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_database_url_is_required() {
        let err = load(&[("PORT", "8080")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/wallet"),
            ("PORT", "8080"),
            ("GATEWAY_A_CHECKOUT_URL", "http://localhost:9001"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.gateway_a_url, "http://localhost:9001");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4317"));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(load(&[("DATABASE_URL", "x"), ("PORT", "abc")]).is_err());
        assert!(load(&[("DATABASE_URL", "x"), ("REQUEST_TIMEOUT_SECS", "0")]).is_err());
    }
}
