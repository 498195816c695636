//! castkit Serve - HTTP gateway for OpenRank and the casts database.
//!
//! This binary starts the API server that forwards OpenRank queries and
//! serves cast feeds from Postgres.

use axum::Router;
use axum::http::Request;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use castkit_core::metrics;
use castkit_serve::{AppState, Config, router};

/// castkit gateway for OpenRank and Farcaster casts.
#[derive(Parser, Debug)]
#[command(name = "castkit-serve")]
#[command(about = "HTTP gateway for OpenRank rankings and Farcaster casts", long_about = None)]
struct Args {
    /// Path to .env file (optional).
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Environment first, so RUST_LOG from the file reaches the filter
    if std::path::Path::new(&args.dotenv).exists() {
        dotenvy::from_path(&args.dotenv)?;
        eprintln!("Loaded environment from {}", args.dotenv);
    }
    init_tracing();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();

    // Prometheus exporter runs on its own port, apart from the gateway
    if let Some(port) = config.metrics_port {
        serve_metrics(port).await?;
    }

    let app = with_middleware(router(AppState::new(config)?));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "castkit gateway listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` filter (default `info`) with plain fmt output.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve_metrics(port: u16) -> anyhow::Result<()> {
    let handle = metrics::try_init_metrics()
        .ok_or_else(|| anyhow::anyhow!("metrics recorder already installed"))?;
    metrics::start_metrics_server(port, handle).await?;
    Ok(())
}

/// Request spans and permissive CORS. Browser clients call the gateway
/// directly with their own `Authorization` header.
fn with_middleware(app: Router) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        tracing::span!(
            Level::INFO,
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            query = request.uri().query().unwrap_or("")
        )
    });
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.layer(trace).layer(cors)
}
