//! castkit Serve - HTTP gateway for OpenRank and the Farcaster casts database
//!
//! This crate exposes two groups of endpoints:
//!
//! - `/openrank/*`: thin passthrough routes that normalize parameters, validate
//!   identifier lists and forward to the OpenRank ranking and graph APIs,
//!   relaying whatever upstream answers.
//! - `/casts/*`: parameterized Postgres queries over stored casts, returned
//!   as JSON with hex-encoded hashes.
//!
//! # Authentication
//!
//! The gateway holds no credentials. The caller's `Authorization` header is
//! forwarded upstream unchanged.
//!
//! # Architecture
//!
//! - **AppState**: Shared application state (configuration, upstream client, Postgres pool)
//! - **Upstream**: Single-shot forwarder that relays upstream status and body
//! - **Casts**: Query builder for the fixed casts query shapes
//! - **Routes**: Endpoint handlers grouped by domain

mod auth;
pub mod casts;
pub mod config;
mod error;
mod routes;
mod state;
pub mod upstream;

pub use self::auth::ForwardedAuth;
pub use self::config::Config;
pub use self::error::{ApiError, ErrorResponse, INTERNAL_ERROR_MESSAGE};
pub use self::routes::router;
pub use self::state::AppState;
