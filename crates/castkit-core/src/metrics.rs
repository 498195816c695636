//! Prometheus metrics helpers for castkit.
//!
//! # Usage
//!
//! ```rust,ignore
//! use castkit_core::metrics::{init_metrics, start_metrics_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = init_metrics();
//!     start_metrics_server(9091, handle).await.unwrap();
//!
//!     castkit_core::metrics::record_upstream("rankings", 200);
//! }
//! ```
//!
//! # Metric Naming Conventions
//!
//! - Prefix: component (`openrank_`, `casts_`)
//! - Suffix: unit or type (`_total`, `_seconds`)
//! - Labels: route names and status codes only; identifiers never become labels

use std::net::SocketAddr;
use std::time::Duration;

use axum::{Router, routing::get};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
///
/// This must be called once at startup before any metrics are recorded.
///
/// # Panics
///
/// Panics if called more than once (the recorder can only be installed once).
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    register_common_metrics();

    handle
}

/// Try to initialize the Prometheus metrics recorder.
///
/// Like [`init_metrics`] but returns `None` if the recorder is already installed.
pub fn try_init_metrics() -> Option<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder().ok()?;
    register_common_metrics();
    Some(handle)
}

/// Start the Prometheus metrics HTTP server on `port`.
///
/// Binds before returning so a port conflict is reported to the caller, then
/// serves `/metrics` from a background task.
pub async fn start_metrics_server(
    port: u16,
    handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on http://{}/metrics", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "metrics server stopped");
        }
    });

    Ok(())
}

/// Register descriptions for the metrics castkit records.
///
/// Called automatically by [`init_metrics`].
fn register_common_metrics() {
    // =========================================================================
    // OpenRank gateway
    // =========================================================================

    describe_counter!(
        "openrank_upstream_requests_total",
        "Upstream OpenRank responses relayed, by route and status"
    );
    describe_counter!(
        "openrank_upstream_failures_total",
        "Upstream calls that failed in transport or returned non-JSON, by route"
    );
    describe_counter!(
        "openrank_validation_rejections_total",
        "Requests rejected with 400 before any upstream call, by route"
    );
    describe_histogram!(
        "openrank_upstream_duration_seconds",
        "Latency of upstream OpenRank calls, by route"
    );

    // =========================================================================
    // Casts
    // =========================================================================

    describe_counter!("casts_queries_total", "Casts queries executed, by shape");
}

// =============================================================================
// Metric Recording Helpers
// =============================================================================

/// Record a relayed upstream response.
pub fn record_upstream(route: &'static str, status: u16) {
    metrics::counter!("openrank_upstream_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
}

/// Record an upstream transport or decode failure.
pub fn record_upstream_failure(route: &'static str) {
    metrics::counter!("openrank_upstream_failures_total", "route" => route).increment(1);
}

/// Record the latency of an upstream call.
pub fn record_upstream_duration(route: &'static str, elapsed: Duration) {
    metrics::histogram!("openrank_upstream_duration_seconds", "route" => route)
        .record(elapsed.as_secs_f64());
}

/// Record a request rejected by validation.
pub fn record_rejection(route: &'static str) {
    metrics::counter!("openrank_validation_rejections_total", "route" => route).increment(1);
}

/// Record an executed casts query.
#[inline]
pub fn record_casts_query(shape: &'static str) {
    metrics::counter!("casts_queries_total", "shape" => shape).increment(1);
}
