use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

fn default_max_connections() -> u32 {
    (num_cpus::get() * 2) as u32
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or_default();
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("PORT is not a port: {raw}"))?,
            None => 8000,
        };
        let max_connections: u32 = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS is not a number: {raw}"))?,
            None => default_max_connections(),
        };
        let acquire_timeout_secs: u64 = match lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DB_ACQUIRE_TIMEOUT_SECS is not a number: {raw}"))?,
            None => 5,
        };

        let config = Self {
            database_url,
            host,
            port,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(anyhow!("DATABASE_URL must be set"));
        }
        let lower = self.database_url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("DATABASE_URL must start with postgres:// or postgresql://"));
        }
        if self.port == 0 {
            return Err(anyhow!("PORT must be in 1..=65535"));
        }
        if self.max_connections == 0 {
            return Err(anyhow!("DB_MAX_CONNECTIONS must be >= 1"));
        }
        if self.acquire_timeout.is_zero() {
            return Err(anyhow!("DB_ACQUIRE_TIMEOUT_SECS must be a positive number of seconds"));
        }
        Ok(())
    }

    /// Host and port for `TcpListener::bind`; the host may be a name or an IP literal.
    pub fn bind_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://u:p@db/contacts")])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.max_connections >= 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.bind_target(), ("0.0.0.0", 8000));
    }

    #[test]
    fn missing_or_foreign_url_is_rejected() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("DATABASE_URL", "mysql://db/contacts")])).is_err());
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let url = ("DATABASE_URL", "postgresql://db/contacts");
        assert!(Config::from_lookup(lookup(&[url, ("PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[url, ("PORT", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[url, ("DB_MAX_CONNECTIONS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[url, ("DB_ACQUIRE_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/contacts"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("DB_MAX_CONNECTIONS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.bind_target(), ("127.0.0.1", 9090));
        assert_eq!(config.max_connections, 3);
    }

    #[tokio::test]
    async fn hostname_bind_target_resolves() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/contacts"),
            ("HOST", "localhost"),
            ("PORT", "8000"),
        ]))
        .unwrap();
        let addrs: Vec<_> = tokio::net::lookup_host(config.bind_target())
            .await
            .unwrap()
            .collect();
        assert!(!addrs.is_empty());
        assert!(addrs.iter().all(|addr| addr.port() == 8000));
    }
}
