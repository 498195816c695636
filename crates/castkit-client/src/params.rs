//! Request parameters for the gateway endpoints.
//!
//! Every parameter type is checked locally before anything is sent, using the
//! same enumerations and defaults the gateway applies. Invalid identifier
//! combinations are reported as [`ValidationError`]; out-of-range options fall
//! back to their defaults.

use castkit_core::params::MAX_LIMIT;
use castkit_core::{
    Aggregation, FrameParams, GraphStrategy, IdentifierSet, ValidationError, Voting,
    normalize_k, normalize_limit, normalize_offset, normalize_weights, resolve_direct_links,
};
use serde::Serialize;

/// Every hook caps `limit` at 100.
fn capped_limit(limit: Option<i64>) -> u32 {
    normalize_limit(limit, Some(MAX_LIMIT))
}

/// Global ranking page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalRankParams {
    pub strategy: Option<GraphStrategy>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl GlobalRankParams {
    pub fn strategy(&self) -> GraphStrategy {
        self.strategy.unwrap_or_default()
    }

    pub fn limit(&self) -> u32 {
        capped_limit(self.limit)
    }

    pub fn offset(&self) -> u64 {
        normalize_offset(self.offset)
    }
}

/// Global rank of specific accounts, by handles or fids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserGlobalRankParams {
    pub strategy: Option<GraphStrategy>,
    pub handles: Option<Vec<String>>,
    pub fids: Option<Vec<u64>>,
}

impl UserGlobalRankParams {
    pub fn identifiers(&self) -> Result<IdentifierSet, ValidationError> {
        resolve_direct_links(self.handles.clone(), self.fids.clone())
    }
}

/// Personalized neighbors of a set of accounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalizedNeighborsParams {
    pub strategy: Option<GraphStrategy>,
    pub ids: IdentifierSet,
    /// Query the plain neighbor graph instead of personalized scores.
    pub without_rank_score: bool,
    pub k: Option<i64>,
    pub limit: Option<i64>,
}

impl PersonalizedNeighborsParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ids.is_empty() {
            return Err(ValidationError::Missing {
                field: self.ids.kind().as_str(),
            });
        }
        Ok(())
    }

    pub fn k(&self) -> u32 {
        normalize_k(self.k)
    }

    pub fn limit(&self) -> u32 {
        capped_limit(self.limit)
    }
}

/// Farcaster handles owning the given addresses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HandlesByAddressesParams {
    pub addresses: Vec<String>,
}

impl HandlesByAddressesParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("addresses", &self.addresses)
    }
}

/// Addresses owned by the given handles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddressesByHandlesParams {
    pub handles: Vec<String>,
}

impl AddressesByHandlesParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("handles", &self.handles)
    }
}

fn non_empty(field: &'static str, ids: &[String]) -> Result<(), ValidationError> {
    if ids.is_empty() {
        Err(ValidationError::Missing { field })
    } else {
        Ok(())
    }
}

/// Accounts the input accounts engaged with or follow directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectLinksParams {
    pub strategy: Option<GraphStrategy>,
    pub handles: Option<Vec<String>>,
    pub fids: Option<Vec<u64>>,
    pub limit: Option<i64>,
}

impl DirectLinksParams {
    /// Exactly one of handles or fids must be non-empty.
    pub fn identifiers(&self) -> Result<IdentifierSet, ValidationError> {
        resolve_direct_links(self.handles.clone(), self.fids.clone())
    }

    pub fn limit(&self) -> u32 {
        capped_limit(self.limit)
    }
}

/// Globally ranked frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FramesGlobalParams {
    pub agg: Option<Aggregation>,
    pub weights: Option<String>,
    pub details: bool,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl FramesGlobalParams {
    /// Query pairs in the order `agg, weights, limit, offset, details`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("agg", self.agg.unwrap_or_default().as_str().to_string()),
            ("weights", normalize_weights(self.weights.as_deref())),
            ("limit", capped_limit(self.limit).to_string()),
            ("offset", normalize_offset(self.offset).to_string()),
            ("details", self.details.to_string()),
        ]
    }
}

/// Frames ranked by the extended network of the input accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FramesPersonalizedParams {
    pub agg: Option<Aggregation>,
    pub weights: Option<String>,
    pub voting: Option<Voting>,
    pub k: Option<i64>,
    pub limit: Option<i64>,
    pub handles: Option<Vec<String>>,
    pub fids: Option<Vec<u64>>,
}

impl FramesPersonalizedParams {
    pub fn identifiers(&self) -> Result<IdentifierSet, ValidationError> {
        resolve_direct_links(self.handles.clone(), self.fids.clone())
    }

    /// Normalized frame options, without `details`.
    pub fn frame_params(&self) -> FrameParams {
        FrameParams {
            agg: self.agg.unwrap_or_default(),
            weights: normalize_weights(self.weights.as_deref()),
            voting: self.voting.unwrap_or_default(),
            k: normalize_k(self.k),
            limit: capped_limit(self.limit),
            details: false,
        }
    }
}

/// Page of the latest-casts feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatestCastsParams {
    pub fid: Option<u64>,
    pub parent_url: Option<String>,
    pub cursor: Option<u64>,
    pub limit: Option<u64>,
}

impl LatestCastsParams {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(fid) = self.fid {
            pairs.push(("fid", fid.to_string()));
        }
        if let Some(parent_url) = &self.parent_url {
            pairs.push(("parent_url", parent_url.clone()));
        }
        if let Some(cursor) = self.cursor {
            pairs.push(("cursor", cursor.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}
