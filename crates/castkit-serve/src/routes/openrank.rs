//! OpenRank passthrough endpoints.
//!
//! Every path registered here is also the upstream path, so the route label
//! used in logs and metrics names both sides of the call. Handlers validate
//! and normalize, then hand a single [`OutboundRequest`] to the forwarder.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::routing::{MethodRouter, post};
use castkit_core::params::MAX_LIMIT;
use castkit_core::{
    FrameParams, GraphStrategy, IdKind, IdentifierSet, RankingStrategy, RawFrameParams,
    ValidationError, normalize_k, normalize_limit, normalize_offset, parse_int,
    resolve_direct_links, value_as_int,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::validated;
use crate::auth::ForwardedAuth;
use crate::error::ApiError;
use crate::state::AppState;
use crate::upstream::{Host, OutboundRequest, UpstreamResponse};

type Relayed = Result<UpstreamResponse, ApiError>;

/// Links: bare identifier array in the body, `limit` in the query (capped).
const LINKS: [(&str, IdKind); 4] = [
    ("/links/engagement/handles", IdKind::Handles),
    ("/links/following/handles", IdKind::Handles),
    ("/links/engagement/fids", IdKind::Fids),
    ("/links/following/fids", IdKind::Fids),
];

/// Direct links: `{handles, fids, limit}`, dispatched to one of the links paths.
const DIRECT_LINKS: [(&str, GraphStrategy); 2] = [
    ("/links/engagement", GraphStrategy::Engagement),
    ("/links/following", GraphStrategy::Following),
];

/// Neighbors and personalized scores: `{<kind>, k, limit}` in the body.
const NEIGHBORS: [(&str, IdKind); 12] = [
    ("/graph/neighbors/engagement/handles", IdKind::Handles),
    ("/graph/neighbors/following/handles", IdKind::Handles),
    ("/graph/neighbors/engagement/fids", IdKind::Fids),
    ("/graph/neighbors/following/fids", IdKind::Fids),
    ("/graph/neighbors/engagement/addresses", IdKind::Addresses),
    ("/graph/neighbors/following/addresses", IdKind::Addresses),
    ("/scores/personalized/engagement/handles", IdKind::Handles),
    ("/scores/personalized/following/handles", IdKind::Handles),
    ("/scores/personalized/engagement/fids", IdKind::Fids),
    ("/scores/personalized/following/fids", IdKind::Fids),
    ("/scores/personalized/engagement/addresses", IdKind::Addresses),
    ("/scores/personalized/following/addresses", IdKind::Addresses),
];

/// Global rankings: `{offset, limit}` in the body, sent upstream as a GET.
const GLOBAL_RANKINGS: [&str; 2] = [
    "/scores/global/following/rankings",
    "/scores/global/engagement/rankings",
];

/// Bare identifier array forwarded as-is. The last column is the field named
/// in the 400 message, which for metadata does not always match the kind.
const LISTS: [(&str, IdKind, &str); 9] = [
    ("/scores/global/following/fids", IdKind::Fids, "fids"),
    ("/scores/global/following/handles", IdKind::Handles, "handles"),
    ("/scores/global/engagement/fids", IdKind::Fids, "fids"),
    ("/scores/global/engagement/handles", IdKind::Handles, "handles"),
    // Handles looked up by address: the body holds addresses.
    ("/metadata/handles", IdKind::Addresses, "handles"),
    ("/metadata/fids", IdKind::Fids, "fids"),
    // Addresses looked up by handle: the body holds handles.
    ("/metadata/addresses", IdKind::Handles, "addresses"),
    ("/metadata/addresses/fids", IdKind::Fids, "fids"),
    ("/metadata/addresses/handles", IdKind::Handles, "handles"),
];

/// Personalized frames: bare identifier array plus frame options in the query.
const FRAMES_PERSONALIZED: [(&str, IdKind); 2] = [
    ("/frames/personalized/rankings/fids", IdKind::Fids),
    ("/frames/personalized/rankings/handles", IdKind::Handles),
];

const FRAMES_GLOBAL: &str = "/frames/global/rankings";

/// Build the `/openrank` sub-router.
pub fn router() -> Router<AppState> {
    let mut router = Router::new()
        .route("/rankings", post(rankings))
        .route("/ranking_index", post(ranking_index))
        .route(FRAMES_GLOBAL, post(frames_global));

    for (path, kind) in LINKS {
        router = router.route(path, links_route(path, kind));
    }
    for (path, strategy) in DIRECT_LINKS {
        router = router.route(path, direct_links_route(path, strategy));
    }
    for (path, kind) in NEIGHBORS {
        router = router.route(path, neighbors_route(path, kind));
    }
    for path in GLOBAL_RANKINGS {
        router = router.route(path, global_rankings_route(path));
    }
    for (path, kind, field) in LISTS {
        router = router.route(path, list_route(path, kind, field));
    }
    for (path, kind) in FRAMES_PERSONALIZED {
        router = router.route(path, frames_personalized_route(path, kind));
    }

    router
}

/// Deserialize an optional JSON object body. Empty or `null` yields the default.
///
/// Numeric options are kept as raw [`Value`]s so a malformed number falls back
/// to its default instead of failing the whole body.
fn parse_object<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ValidationError> {
    let trimmed = body.trim_ascii();
    if trimmed.is_empty() || trimmed == b"null" {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(trimmed)?)
}

// ═══════════════════════════════════════════════════════════════════════════
// Ranking API
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
struct RankingsBody {
    strategy: Option<String>,
    limit: Option<Value>,
    offset: Option<Value>,
}

/// `POST /openrank/rankings`
///
/// `limit` and `offset` are only sent upstream when non-zero.
async fn rankings(State(state): State<AppState>, auth: ForwardedAuth, body: Bytes) -> Relayed {
    const ROUTE: &str = "/rankings";

    let body: RankingsBody = validated(ROUTE, parse_object(&body))?;
    let strategy = validated(ROUTE, RankingStrategy::parse(body.strategy.as_deref()))?;

    let mut request = OutboundRequest::get(Host::Api, ROUTE).query("strategy", strategy.as_str());
    if let Some(limit) = value_as_int(body.limit.as_ref()).filter(|&n| n > 0) {
        request = request.query("limit", limit);
    }
    if let Some(offset) = value_as_int(body.offset.as_ref()).filter(|&n| n > 0) {
        request = request.query("offset", offset);
    }

    state.upstream.forward(ROUTE, request, auth.into_inner()).await
}

#[derive(Debug, Default, Deserialize)]
struct RankingIndexBody {
    strategy: Option<String>,
    username: Option<String>,
}

/// `POST /openrank/ranking_index`
///
/// `username` is checked before `strategy`.
async fn ranking_index(State(state): State<AppState>, auth: ForwardedAuth, body: Bytes) -> Relayed {
    const ROUTE: &str = "/ranking_index";

    let body: RankingIndexBody = validated(ROUTE, parse_object(&body))?;
    let username = validated(
        ROUTE,
        body.username
            .filter(|u| !u.is_empty())
            .ok_or(ValidationError::Missing { field: "username" }),
    )?;
    let strategy = validated(ROUTE, RankingStrategy::parse(body.strategy.as_deref()))?;

    let request = OutboundRequest::get(Host::Api, ROUTE)
        .query("strategy", strategy.as_str())
        .query("username", username);

    state.upstream.forward(ROUTE, request, auth.into_inner()).await
}

// ═══════════════════════════════════════════════════════════════════════════
// Graph API: links
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
struct LimitQuery {
    limit: Option<String>,
}

fn links_route(path: &'static str, kind: IdKind) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>,
              auth: ForwardedAuth,
              Query(query): Query<LimitQuery>,
              body: Bytes| links(state, auth, query, body, path, kind),
    )
}

async fn links(
    state: AppState,
    auth: ForwardedAuth,
    query: LimitQuery,
    body: Bytes,
    path: &'static str,
    kind: IdKind,
) -> Relayed {
    let ids = validated(path, IdentifierSet::parse_body(kind, kind.as_str(), &body))?;
    let limit = normalize_limit(parse_int(query.limit.as_deref()), Some(MAX_LIMIT));

    let request = OutboundRequest::post(Host::Graph, path, ids).query("limit", limit);
    state.upstream.forward(path, request, auth.into_inner()).await
}

#[derive(Debug, Default, Deserialize)]
struct DirectLinksBody {
    handles: Option<Vec<String>>,
    fids: Option<Vec<u64>>,
    limit: Option<Value>,
}

fn direct_links_route(path: &'static str, strategy: GraphStrategy) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>, auth: ForwardedAuth, body: Bytes| {
            direct_links(state, auth, body, path, strategy)
        },
    )
}

/// Links by either handles or fids, never both.
async fn direct_links(
    state: AppState,
    auth: ForwardedAuth,
    body: Bytes,
    path: &'static str,
    strategy: GraphStrategy,
) -> Relayed {
    let body: DirectLinksBody = validated(path, parse_object(&body))?;
    let ids = validated(path, resolve_direct_links(body.handles, body.fids))?;
    let limit = normalize_limit(value_as_int(body.limit.as_ref()), Some(MAX_LIMIT));

    let upstream_path = format!("/links/{}/{}", strategy.as_str(), ids.kind().as_str());
    let request = OutboundRequest::post(Host::Graph, upstream_path, ids).query("limit", limit);
    state.upstream.forward(path, request, auth.into_inner()).await
}

// ═══════════════════════════════════════════════════════════════════════════
// Graph API: neighbors and personalized scores
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
struct NeighborsBody {
    handles: Option<Vec<String>>,
    fids: Option<Vec<u64>>,
    addresses: Option<Vec<String>>,
    k: Option<Value>,
    limit: Option<Value>,
}

impl NeighborsBody {
    fn identifiers(self, kind: IdKind) -> Result<IdentifierSet, ValidationError> {
        match kind {
            IdKind::Fids => IdentifierSet::from_fids("fids", self.fids),
            IdKind::Handles => IdentifierSet::from_strings(kind, "handles", self.handles),
            IdKind::Addresses => IdentifierSet::from_strings(kind, "addresses", self.addresses),
        }
    }
}

fn neighbors_route(path: &'static str, kind: IdKind) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>, auth: ForwardedAuth, body: Bytes| {
            neighbors(state, auth, body, path, kind)
        },
    )
}

/// Only the identifier list is forwarded; `k` and `limit` move to the query.
async fn neighbors(
    state: AppState,
    auth: ForwardedAuth,
    body: Bytes,
    path: &'static str,
    kind: IdKind,
) -> Relayed {
    let body: NeighborsBody = validated(path, parse_object(&body))?;
    let k = normalize_k(value_as_int(body.k.as_ref()));
    let limit = normalize_limit(value_as_int(body.limit.as_ref()), None);
    let ids = validated(path, body.identifiers(kind))?;

    let request = OutboundRequest::post(Host::Graph, path, ids)
        .query("k", k)
        .query("limit", limit);
    state.upstream.forward(path, request, auth.into_inner()).await
}

// ═══════════════════════════════════════════════════════════════════════════
// Graph API: global scores and metadata
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
struct PageBody {
    offset: Option<Value>,
    limit: Option<Value>,
}

fn global_rankings_route(path: &'static str) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>, auth: ForwardedAuth, body: Bytes| {
            global_rankings(state, auth, body, path)
        },
    )
}

async fn global_rankings(
    state: AppState,
    auth: ForwardedAuth,
    body: Bytes,
    path: &'static str,
) -> Relayed {
    let body: PageBody = validated(path, parse_object(&body))?;

    let request = OutboundRequest::get(Host::Graph, path)
        .query("offset", normalize_offset(value_as_int(body.offset.as_ref())))
        .query("limit", normalize_limit(value_as_int(body.limit.as_ref()), None));
    state.upstream.forward(path, request, auth.into_inner()).await
}

fn list_route(path: &'static str, kind: IdKind, field: &'static str) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>, auth: ForwardedAuth, body: Bytes| {
            list(state, auth, body, path, kind, field)
        },
    )
}

async fn list(
    state: AppState,
    auth: ForwardedAuth,
    body: Bytes,
    path: &'static str,
    kind: IdKind,
    field: &'static str,
) -> Relayed {
    let ids = validated(path, IdentifierSet::parse_body(kind, field, &body))?;

    let request = OutboundRequest::post(Host::Graph, path, ids);
    state.upstream.forward(path, request, auth.into_inner()).await
}

// ═══════════════════════════════════════════════════════════════════════════
// Graph API: frames
// ═══════════════════════════════════════════════════════════════════════════

/// `POST /openrank/frames/global/rankings`
///
/// Frame options come from the query string; sent upstream as a GET.
async fn frames_global(
    State(state): State<AppState>,
    auth: ForwardedAuth,
    Query(raw): Query<RawFrameParams>,
) -> Relayed {
    let params = FrameParams::normalize(&raw, None);

    let request =
        OutboundRequest::get(Host::Graph, FRAMES_GLOBAL).query_pairs(params.query_pairs(true));
    state
        .upstream
        .forward(FRAMES_GLOBAL, request, auth.into_inner())
        .await
}

fn frames_personalized_route(path: &'static str, kind: IdKind) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>,
              auth: ForwardedAuth,
              Query(raw): Query<RawFrameParams>,
              body: Bytes| frames_personalized(state, auth, raw, body, path, kind),
    )
}

async fn frames_personalized(
    state: AppState,
    auth: ForwardedAuth,
    raw: RawFrameParams,
    body: Bytes,
    path: &'static str,
    kind: IdKind,
) -> Relayed {
    let params = FrameParams::normalize(&raw, None);
    let ids = validated(path, IdentifierSet::parse_body(kind, kind.as_str(), &body))?;

    let request = OutboundRequest::post(Host::Graph, path, ids).query_pairs(params.query_pairs(false));
    state.upstream.forward(path, request, auth.into_inner()).await
}
