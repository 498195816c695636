//! Application configuration loaded from environment variables.

use castkit_core::{DEFAULT_OPENRANK_API_URL, DEFAULT_OPENRANK_GRAPH_URL};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Postgres connection URL for the casts database.
    pub database_url: String,

    /// Maximum number of pooled Postgres connections.
    pub database_max_connections: u32,

    /// Base URL of the OpenRank ranking API.
    pub openrank_api_url: String,

    /// Base URL of the OpenRank graph API.
    pub openrank_graph_url: String,

    /// Whether `GET /casts/{hash}` is mounted. Off by default.
    pub enable_cast_lookup: bool,

    /// Port for the Prometheus `/metrics` endpoint (disabled when unset).
    pub metrics_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - None (all have defaults for local development)
    ///
    /// Optional:
    /// - `CASTKIT_BIND_ADDR`: Server bind address (default: "0.0.0.0:8080")
    /// - `DATABASE_URL`: Postgres URL (default: "postgres://localhost/farcaster")
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
    /// - `OPENRANK_API_URL`: Ranking API base (default: "https://api.cast.k3l.io")
    /// - `OPENRANK_GRAPH_URL`: Graph API base (default: "https://graph.cast.k3l.io")
    /// - `CASTS_ENABLE_LOOKUP`: Mount the single-cast lookup route ("true"/"1")
    /// - `METRICS_PORT`: Serve Prometheus metrics on this port
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("CASTKIT_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/farcaster".to_string());

        let database_max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value.trim().parse::<u32>().map_err(|_| {
                anyhow::anyhow!("DATABASE_MAX_CONNECTIONS must be a positive integer, got '{value}'")
            })?,
            Err(_) => 10,
        };
        if database_max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        let openrank_api_url = base_url_var("OPENRANK_API_URL", DEFAULT_OPENRANK_API_URL);
        let openrank_graph_url = base_url_var("OPENRANK_GRAPH_URL", DEFAULT_OPENRANK_GRAPH_URL);

        let enable_cast_lookup = std::env::var("CASTS_ENABLE_LOOKUP")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);

        let metrics_port = match std::env::var("METRICS_PORT") {
            Ok(value) if !value.trim().is_empty() => Some(
                value
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| anyhow::anyhow!("METRICS_PORT must be a port number, got '{value}'"))?,
            ),
            _ => None,
        };

        tracing::info!(
            bind_addr = %bind_addr,
            openrank_api_url = %openrank_api_url,
            openrank_graph_url = %openrank_graph_url,
            database_max_connections,
            enable_cast_lookup,
            metrics_port = ?metrics_port,
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            database_url,
            database_max_connections,
            openrank_api_url,
            openrank_graph_url,
            enable_cast_lookup,
            metrics_port,
        })
    }
}

fn base_url_var(key: &str, default: &str) -> String {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize config tests that manipulate env vars.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "CASTKIT_BIND_ADDR",
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "OPENRANK_API_URL",
        "OPENRANK_GRAPH_URL",
        "CASTS_ENABLE_LOOKUP",
        "METRICS_PORT",
    ];

    /// Helper to run config tests with isolated env vars.
    fn with_env_vars<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

        let saved: Vec<_> = ENV_KEYS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        // SAFETY: Serialized by mutex; only test code touches these vars.
        unsafe {
            for k in ENV_KEYS {
                std::env::remove_var(k);
            }
            for (k, v) in vars {
                std::env::set_var(k, v);
            }
        }

        f();

        // SAFETY: Restoring original env state.
        unsafe {
            for (k, v) in &saved {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn config_defaults() {
        with_env_vars(&[], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.bind_addr, "0.0.0.0:8080");
            assert_eq!(config.database_url, "postgres://localhost/farcaster");
            assert_eq!(config.database_max_connections, 10);
            assert_eq!(config.openrank_api_url, "https://api.cast.k3l.io");
            assert_eq!(config.openrank_graph_url, "https://graph.cast.k3l.io");
            assert!(!config.enable_cast_lookup);
            assert_eq!(config.metrics_port, None);
        });
    }

    #[test]
    fn config_custom_values() {
        with_env_vars(
            &[
                ("CASTKIT_BIND_ADDR", "127.0.0.1:9090"),
                ("DATABASE_URL", "postgres://hub:secret@db/hub"),
                ("DATABASE_MAX_CONNECTIONS", "4"),
                ("OPENRANK_API_URL", "http://rank.internal"),
                ("OPENRANK_GRAPH_URL", "http://graph.internal"),
                ("CASTS_ENABLE_LOOKUP", "TRUE"),
                ("METRICS_PORT", "9091"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.bind_addr, "127.0.0.1:9090");
                assert_eq!(config.database_url, "postgres://hub:secret@db/hub");
                assert_eq!(config.database_max_connections, 4);
                assert_eq!(config.openrank_api_url, "http://rank.internal");
                assert_eq!(config.openrank_graph_url, "http://graph.internal");
                assert!(config.enable_cast_lookup);
                assert_eq!(config.metrics_port, Some(9091));
            },
        );
    }

    #[test]
    fn config_upstream_trailing_slash_stripped() {
        with_env_vars(&[("OPENRANK_GRAPH_URL", "https://graph.cast.k3l.io/")], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.openrank_graph_url, "https://graph.cast.k3l.io");
        });
    }

    #[test]
    fn config_rejects_bad_pool_size() {
        with_env_vars(&[("DATABASE_MAX_CONNECTIONS", "many")], || {
            assert!(Config::from_env().is_err());
        });
        with_env_vars(&[("DATABASE_MAX_CONNECTIONS", "0")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_rejects_bad_metrics_port() {
        with_env_vars(&[("METRICS_PORT", "99999")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_lookup_flag_ignores_other_values() {
        with_env_vars(&[("CASTS_ENABLE_LOOKUP", "yes")], || {
            let config = Config::from_env().unwrap();
            assert!(!config.enable_cast_lookup);
        });
    }
}
