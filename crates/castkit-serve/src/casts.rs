//! Postgres query layer for casts.
//!
//! Every query shape returns whole rows as JSON objects, with the binary
//! `hash`/`parent_hash` columns re-encoded as `0x`-prefixed hex and the
//! author's profile picture attached as `pfp`. Rows are never modified.
//!
//! Pagination is arithmetic: the next cursor is the input cursor plus the
//! number of rows returned. Concurrent inserts can shift pages.

use castkit_core::ValidationError;
use castkit_core::metrics;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Default page size for the latest-casts feed.
pub const DEFAULT_LIMIT: i64 = 50;

/// Fixed page size for replies and search.
pub const FIXED_LIMIT: i64 = 50;

/// Shared projection. `to_jsonb(c)` keeps every stored column; the object on
/// the right overrides the hash columns and adds `pfp` (`user_data` type 1).
const SELECT_CASTS: &str = "SELECT to_jsonb(c) || jsonb_build_object(\
     'hash', CONCAT('0x', encode(c.hash, 'hex')), \
     'parent_hash', CONCAT('0x', encode(c.parent_hash, 'hex')), \
     'pfp', ud.value) AS cast_json \
     FROM casts c \
     LEFT JOIN user_data ud ON ud.fid = c.fid AND ud.type = 1";

/// One of the fixed casts query shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastQuery {
    /// Newest casts first, optionally filtered by author and channel.
    Latest {
        fid: Option<i64>,
        parent_url: Option<String>,
        cursor: i64,
        limit: i64,
    },
    /// Direct replies to a cast. `parent_hash` is lowercase hex without `0x`.
    Replies { parent_hash: String },
    /// Full-text search over cast text.
    Search { query: String },
    /// A single cast by hash (lowercase hex without `0x`).
    ByHash { hash: String },
}

impl CastQuery {
    /// Short name used in logs and metrics.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Latest { .. } => "latest",
            Self::Replies { .. } => "replies",
            Self::Search { .. } => "search",
            Self::ByHash { .. } => "by_hash",
        }
    }

    /// Row offset the query starts at. Only the latest feed pages.
    pub fn cursor(&self) -> i64 {
        match self {
            Self::Latest { cursor, .. } => *cursor,
            _ => 0,
        }
    }

    /// Build the SQL with all user input bound as parameters.
    pub fn build(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(SELECT_CASTS);

        match self {
            Self::Latest {
                fid,
                parent_url,
                cursor,
                limit,
            } => {
                let mut separator = " WHERE ";
                if let Some(fid) = fid {
                    qb.push(separator).push("c.fid = ").push_bind(*fid);
                    separator = " AND ";
                }
                if let Some(parent_url) = parent_url {
                    qb.push(separator)
                        .push("c.parent_url = ")
                        .push_bind(parent_url.clone());
                }
                qb.push(" ORDER BY c.timestamp DESC OFFSET ")
                    .push_bind(*cursor)
                    .push(" LIMIT ")
                    .push_bind(*limit);
            }
            Self::Replies { parent_hash } => {
                qb.push(" WHERE c.parent_hash = decode(")
                    .push_bind(parent_hash.clone())
                    .push(", 'hex') LIMIT ")
                    .push_bind(FIXED_LIMIT);
            }
            Self::Search { query } => {
                qb.push(" WHERE c.text @@ to_tsquery('english', ")
                    .push_bind(query.clone())
                    .push(") LIMIT ")
                    .push_bind(FIXED_LIMIT);
            }
            Self::ByHash { hash } => {
                qb.push(" WHERE c.hash = decode(")
                    .push_bind(hash.clone())
                    .push(", 'hex') LIMIT 1");
            }
        }

        qb
    }
}

/// Normalize a `0x`-prefixed (or bare) hex hash to lowercase hex without prefix.
pub fn parse_hash(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() {
        return Err(ValidationError::InvalidHash { field });
    }
    let bytes = hex::decode(digits).map_err(|_| ValidationError::InvalidHash { field })?;
    Ok(hex::encode(bytes))
}

/// Cursor for the page after one that started at `cursor` and returned `rows` rows.
pub fn next_cursor(cursor: i64, rows: usize) -> i64 {
    cursor.saturating_add(i64::try_from(rows).unwrap_or(i64::MAX))
}

/// Run a casts query and return its rows.
pub async fn fetch_casts(pool: &PgPool, query: &CastQuery) -> Result<Vec<Value>, sqlx::Error> {
    metrics::record_casts_query(query.shape());
    tracing::debug!(shape = query.shape(), "running casts query");

    let mut builder = query.build();
    let rows = builder
        .build_query_scalar::<Value>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
