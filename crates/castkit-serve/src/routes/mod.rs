//! API route definitions.

mod casts;
mod health;
mod openrank;

use axum::Router;
use axum::routing::get;
use castkit_core::{ValidationError, metrics};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the complete API router.
///
/// # Route Structure
///
/// - `GET /health` - Health check
///
/// ## Casts (Postgres)
/// - `GET /casts/latest` - Newest casts, optionally by author or channel
/// - `GET /casts/replies` - Replies to a cast
/// - `GET /casts/search` - Full-text search
/// - `GET /casts/{hash}` - Single cast (only with `CASTS_ENABLE_LOOKUP`)
///
/// ## OpenRank passthrough
/// All under `/openrank`, POST only. See [`openrank::router`].
pub fn router(state: AppState) -> Router {
    let mut casts = Router::new()
        .route("/casts/latest", get(casts::latest))
        .route("/casts/replies", get(casts::replies))
        .route("/casts/search", get(casts::search));
    if state.config.enable_cast_lookup {
        casts = casts.route("/casts/{hash}", get(casts::lookup));
    }

    Router::new()
        .route("/health", get(health::health_check))
        .merge(casts)
        .nest("/openrank", openrank::router())
        .with_state(state)
}

/// Turn a validation failure into a 400, counting it against `route`.
fn validated<T>(route: &'static str, result: Result<T, ValidationError>) -> Result<T, ApiError> {
    result.map_err(|err| {
        metrics::record_rejection(route);
        tracing::debug!(route, error = %err, "rejected request");
        ApiError::from(err)
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    /// Send `request` through `app` and decode the JSON body (`Null` when empty).
    pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }
}
