//! Application configuration loaded from environment variables.

use std::time::Duration;

use notifier::DEFAULT_SERVICE_NAME;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `SERVICE_NAME`: name stamped into event envelopes (default: `"service-orders"`)
/// - `DATABASE_URL`: PostgreSQL URL; unset runs on the in-memory store and bus
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `DATABASE_ACQUIRE_TIMEOUT_MS`: pool checkout timeout (default: `5000`)
/// - `DATABASE_QUERY_TIMEOUT_MS`: per-statement timeout for the order store (default: `5000`)
/// - `PUBLISH_TIMEOUT_MS`: per-publish timeout (default: `5000`)
/// - `ORDERS_TOPIC_PREFIX`: prefix for the `order--created` topic (default: empty)
/// - `RUN_MIGRATIONS`: create the orders table at startup (default: `true`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub service_name: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub database_acquire_timeout: Duration,
    pub database_query_timeout: Duration,
    pub publish_timeout: Duration,
    pub topic_prefix: String,
    pub run_migrations: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
            service_name: lookup("SERVICE_NAME").unwrap_or(defaults.service_name),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.database_max_connections),
            database_acquire_timeout: millis(
                "DATABASE_ACQUIRE_TIMEOUT_MS",
                defaults.database_acquire_timeout,
            ),
            database_query_timeout: millis(
                "DATABASE_QUERY_TIMEOUT_MS",
                defaults.database_query_timeout,
            ),
            publish_timeout: millis("PUBLISH_TIMEOUT_MS", defaults.publish_timeout),
            topic_prefix: lookup("ORDERS_TOPIC_PREFIX").unwrap_or(defaults.topic_prefix),
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(defaults.run_migrations),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            database_url: None,
            database_max_connections: 5,
            database_acquire_timeout: Duration::from_secs(5),
            database_query_timeout: Duration::from_secs(5),
            publish_timeout: Duration::from_secs(5),
            topic_prefix: String::new(),
            run_migrations: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.service_name, "service-orders");
        assert!(config.database_url.is_none());
        assert!(config.run_migrations);
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = from_pairs(&[]);
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.topic_prefix, "");
        assert_eq!(config.publish_timeout, Duration::from_secs(5));
        assert_eq!(config.database_query_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_values_are_read() {
        let config = from_pairs(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("LOG_FORMAT", "JSON"),
            ("DATABASE_URL", "postgres://localhost/orders"),
            ("DATABASE_ACQUIRE_TIMEOUT_MS", "250"),
            ("DATABASE_QUERY_TIMEOUT_MS", "750"),
            ("ORDERS_TOPIC_PREFIX", "dev-"),
            ("RUN_MIGRATIONS", "false"),
        ]);

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/orders")
        );
        assert_eq!(config.database_acquire_timeout, Duration::from_millis(250));
        assert_eq!(config.database_query_timeout, Duration::from_millis(750));
        assert_eq!(config.topic_prefix, "dev-");
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_unparseable_numbers_fall_back() {
        let config = from_pairs(&[("PORT", "eighty"), ("PUBLISH_TIMEOUT_MS", "-1")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.publish_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_database_url_means_in_memory() {
        let config = from_pairs(&[("DATABASE_URL", "")]);
        assert!(config.database_url.is_none());
    }
}
