//! Casts endpoints backed by Postgres.

use axum::Json;
use axum::extract::{Path, Query, State};
use castkit_core::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validated;
use crate::casts::{self, CastQuery, DEFAULT_LIMIT, next_cursor, parse_hash};
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the latest-casts feed. Kept as strings so a bad
/// number is reported with the field name instead of a generic rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestParams {
    pub fid: Option<String>,
    pub parent_url: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepliesParams {
    pub parent_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// Page of the latest-casts feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestCastsResponse {
    pub casts: Vec<Value>,
    pub next_cursor: i64,
}

impl LatestCastsResponse {
    fn new(casts: Vec<Value>, cursor: i64) -> Self {
        let next_cursor = next_cursor(cursor, casts.len());
        Self { casts, next_cursor }
    }
}

/// Replies and search results. The key is `cast` even though it holds a list.
#[derive(Debug, Clone, Serialize)]
pub struct CastListResponse {
    pub cast: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CastLookupResponse {
    pub cast: Option<Value>,
}

/// Parse an optional non-negative integer. Empty counts as absent.
fn int_param(field: &'static str, value: Option<&str>) -> Result<Option<i64>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .map(Some)
            .ok_or(ValidationError::InvalidInteger { field }),
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::Missing { field })
}

fn latest_query(params: &LatestParams) -> Result<CastQuery, ValidationError> {
    Ok(CastQuery::Latest {
        fid: int_param("fid", params.fid.as_deref())?,
        parent_url: params.parent_url.clone().filter(|url| !url.is_empty()),
        cursor: int_param("cursor", params.cursor.as_deref())?.unwrap_or(0),
        limit: int_param("limit", params.limit.as_deref())?.unwrap_or(DEFAULT_LIMIT),
    })
}

/// `GET /casts/latest`
///
/// Newest casts first. `nextCursor` is the offset of the following page.
pub async fn latest(
    State(state): State<AppState>,
    Query(params): Query<LatestParams>,
) -> Result<Json<LatestCastsResponse>, ApiError> {
    let query = validated("/casts/latest", latest_query(&params))?;

    let rows = casts::fetch_casts(&state.db, &query).await?;
    Ok(Json(LatestCastsResponse::new(rows, query.cursor())))
}

/// `GET /casts/replies`
pub async fn replies(
    State(state): State<AppState>,
    Query(params): Query<RepliesParams>,
) -> Result<Json<CastListResponse>, ApiError> {
    const ROUTE: &str = "/casts/replies";

    let raw = validated(ROUTE, required("parent_hash", params.parent_hash.as_deref()))?;
    let parent_hash = validated(ROUTE, parse_hash("parent_hash", raw))?;

    let cast = casts::fetch_casts(&state.db, &CastQuery::Replies { parent_hash }).await?;
    Ok(Json(CastListResponse { cast }))
}

/// `GET /casts/search`
///
/// `query` uses Postgres `to_tsquery` syntax.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<CastListResponse>, ApiError> {
    let query = validated("/casts/search", required("query", params.query.as_deref()))?;

    let cast = casts::fetch_casts(
        &state.db,
        &CastQuery::Search {
            query: query.to_string(),
        },
    )
    .await?;
    Ok(Json(CastListResponse { cast }))
}

/// `GET /casts/{hash}`
///
/// Only mounted when `CASTS_ENABLE_LOOKUP` is set.
pub async fn lookup(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<CastLookupResponse>, ApiError> {
    let hash = validated("/casts/{hash}", parse_hash("hash", &hash))?;

    let mut rows = casts::fetch_casts(&state.db, &CastQuery::ByHash { hash }).await?;
    let cast = if rows.is_empty() {
        None
    } else {
        Some(rows.swap_remove(0))
    };
    Ok(Json(CastLookupResponse { cast }))
}
