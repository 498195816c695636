//! Rust client SDK for the castkit gateway
//!
//! [`OpenRankClient`] wraps the gateway's OpenRank and casts endpoints.
//! The [`hooks`] module builds refreshing handles on top of it: each keeps a
//! loading flag and the latest result for its parameters, re-fetching when
//! they change.
//!
//! # Example
//!
//! ```rust,no_run
//! use castkit_client::hooks::DirectLinks;
//! use castkit_client::{ClientConfig, DirectLinksParams, OpenRankClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenRankClient::new(ClientConfig {
//!     base_url: "http://localhost:8080".into(),
//!     ..Default::default()
//! })?;
//!
//! let links = DirectLinks::new(
//!     client,
//!     DirectLinksParams {
//!         handles: Some(vec!["dwr.eth".into()]),
//!         ..Default::default()
//!     },
//! )?;
//!
//! let mut updates = links.subscribe();
//! let state = updates.wait_for(|s| !s.is_loading).await?.clone();
//! println!("{} accounts", state.items.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod hooks;
pub mod params;
pub mod types;

// Re-export main types
pub use client::OpenRankClient;
pub use error::{ClientError, Result};
pub use hooks::{Hook, HookQuery, HookState};
pub use params::*;
pub use types::*;
