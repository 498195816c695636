//! Core types and shared utilities for the castkit gateway and SDK.
//!
//! This crate provides:
//! - Parameter normalization for OpenRank queries (strategies, frame options, paging)
//! - Identifier sets (fids, handles, addresses) and direct-links disambiguation
//! - The validation error type surfaced to callers as HTTP 400
//! - Prometheus metrics helpers

mod error;
pub mod ids;
pub mod metrics;
pub mod params;

// ═══════════════════════════════════════════════════════════════════════════
// Upstream hosts
// ═══════════════════════════════════════════════════════════════════════════

/// Default base URL of the OpenRank ranking API (`/rankings`, `/ranking_index`).
pub const DEFAULT_OPENRANK_API_URL: &str = "https://api.cast.k3l.io";

/// Default base URL of the OpenRank graph API (links, neighbors, scores, frames).
pub const DEFAULT_OPENRANK_GRAPH_URL: &str = "https://graph.cast.k3l.io";

pub use error::{Result, ValidationError};
pub use ids::{IdKind, IdentifierSet, resolve_direct_links};
pub use params::{
    Aggregation, FrameParams, GraphStrategy, RankingStrategy, RawFrameParams, Voting,
    normalize_details, normalize_k, normalize_limit, normalize_offset, normalize_weights,
    parse_int, value_as_int,
};
