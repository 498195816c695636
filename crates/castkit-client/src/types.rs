//! Types for the castkit gateway API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the castkit gateway
    pub base_url: String,
    /// Optional API key, sent as `Authorization: Bearer <key>`
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.farcasterkit.com".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// An account in a global or per-user ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    pub fid: u64,
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub rank: Option<u64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub percentile: Option<f64>,
}

/// An account returned by neighbor, links and metadata queries.
///
/// Metadata lookups omit `score`; neighbor queries without rank scores omit it too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub fid: Option<u64>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// A ranked frame URL.
///
/// The cast and interaction lists are only present when details were requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub url: String,
    pub score: f64,
    #[serde(default)]
    pub cast_hashes: Option<Vec<String>>,
    #[serde(default)]
    pub warpcast_urls: Option<Vec<String>>,
    #[serde(default)]
    pub interacted_by_fids: Option<Vec<u64>>,
    #[serde(default)]
    pub interacted_by_fnames: Option<Vec<String>>,
    #[serde(default)]
    pub interacted_by_usernames: Option<Vec<String>>,
}

/// Upstream response envelope. A missing `result` reads as empty.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
}

/// Page of the latest-casts feed.
///
/// Casts are passed through as JSON objects with every stored column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestCastsPage {
    pub casts: Vec<Value>,
    pub next_cursor: i64,
}
