//! Authorization passthrough.
//!
//! The gateway never issues or checks credentials. Whatever the caller sends
//! in `Authorization` is handed to upstream verbatim; a missing header is
//! forwarded as an empty value rather than rejected.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderValue;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The caller's `Authorization` header, or an empty value.
#[derive(Debug, Clone)]
pub struct ForwardedAuth(pub HeaderValue);

impl ForwardedAuth {
    pub fn into_inner(self) -> HeaderValue {
        self.0
    }
}

impl<S> FromRequestParts<S> for ForwardedAuth
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(AUTHORIZATION)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> ForwardedAuth {
        let (mut parts, _) = request.into_parts();
        ForwardedAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn passes_header_verbatim() {
        let request = Request::builder()
            .header(AUTHORIZATION, "Bearer abc123")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.0, "Bearer abc123");
    }

    #[tokio::test]
    async fn missing_header_becomes_empty() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await.0, "");
    }
}
