//! Application state shared across all request handlers.

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::upstream::{Upstream, UpstreamHosts};

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// HTTP client for the OpenRank APIs.
    pub upstream: Upstream,

    /// Postgres pool for the casts database.
    pub db: PgPool,
}

impl AppState {
    /// Create a new application state from configuration.
    ///
    /// The pool connects lazily, so a missing database only surfaces on the
    /// first casts query. Must be called inside a tokio runtime.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let hosts = UpstreamHosts::parse(&config.openrank_api_url, &config.openrank_graph_url)?;
        let upstream = Upstream::new(hosts)?;

        let db = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect_lazy(&config.database_url)?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            upstream,
            db,
        })
    }
}

/// Configuration for router tests: no database is contacted until a casts query runs.
#[cfg(test)]
pub(crate) fn test_config(api_url: &str, graph_url: &str) -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        database_url: "postgres://localhost/castkit_test".to_string(),
        database_max_connections: 1,
        openrank_api_url: api_url.to_string(),
        openrank_graph_url: graph_url.to_string(),
        enable_cast_lookup: true,
        metrics_port: None,
    }
}
