//! Server configuration from the environment.

use taskdeck_core::{defaults, Error, Result};
use taskdeck_db::PoolConfig;

/// Global rate limit settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Requests allowed per period.
    pub requests: u64,
    pub period_secs: u64,
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub rate_limit: RateLimitConfig,
    /// Raw `ALLOWED_ORIGINS` value, parsed by the CORS layer.
    pub allowed_origins: Option<String>,
    pub pool: PoolConfig,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    ///
    /// `DATABASE_URL` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("DATABASE_URL must be set to a PostgreSQL connection URL".into())
            })?;

        let host = lookup("HOST").unwrap_or_else(|| defaults::SERVER_HOST.to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {}", raw)))?,
            None => defaults::SERVER_PORT,
        };

        let rate_limit = RateLimitConfig {
            enabled: lookup("RATE_LIMIT_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            requests: lookup("RATE_LIMIT_REQUESTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::RATE_LIMIT_REQUESTS),
            period_secs: lookup("RATE_LIMIT_PERIOD_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::RATE_LIMIT_PERIOD_SECS),
        };

        let pool = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(max) if max > 0 => PoolConfig::default().capped(max),
                _ => {
                    return Err(Error::Config(format!(
                        "DATABASE_MAX_CONNECTIONS must be a positive integer: {}",
                        raw
                    )))
                }
            },
            None => PoolConfig::default(),
        };

        Ok(Self {
            database_url,
            host,
            port,
            rate_limit,
            allowed_origins: lookup("ALLOWED_ORIGINS"),
            pool,
        })
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_database_url_is_fatal() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let config =
            ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/td")]))
                .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.requests, 100);
        assert_eq!(config.rate_limit.period_secs, 60);
        assert!(config.allowed_origins.is_none());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.pool, PoolConfig::default());
    }

    #[test]
    fn test_pool_size_override() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/td"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
        ]))
        .unwrap();
        assert_eq!(config.pool.max_connections, 25);
        assert_eq!(config.pool.min_connections, 1);

        for bad in ["0", "-3", "many"] {
            let err = ServerConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://localhost/td"),
                ("DATABASE_MAX_CONNECTIONS", bad),
            ]))
            .unwrap_err();
            assert!(matches!(err, Error::Config(_)));
        }
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/td"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("RATE_LIMIT_ENABLED", "false"),
            ("RATE_LIMIT_REQUESTS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.rate_limit.requests, 5);
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/td"),
            ("PORT", "http"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
