//! HTTP client for the castkit gateway

use std::time::Duration;

use reqwest::{Client, Method, header};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};
use crate::params::*;
use crate::types::*;

/// HTTP client for the castkit gateway.
///
/// Cheap to clone; clones share one connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use castkit_client::{ClientConfig, GlobalRankParams, OpenRankClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OpenRankClient::new(ClientConfig {
///     base_url: "http://localhost:8080".into(),
///     api_key: Some("secret".into()),
///     ..Default::default()
/// })?;
///
/// let top = client.global_rankings(&GlobalRankParams::default()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OpenRankClient {
    base_url: String,
    client: Client,
}

impl OpenRankClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(api_key) = &config.api_key {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {api_key}"))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    // ==================== Global scores ====================

    /// Top accounts by global rank.
    pub async fn global_rankings(&self, params: &GlobalRankParams) -> Result<Vec<Rank>> {
        let path = format!("/openrank/scores/global/{}/rankings", params.strategy().as_str());
        let (limit, offset) = (params.limit(), params.offset());
        let query = [("limit", limit.to_string()), ("offset", offset.to_string())];
        let body = serde_json::json!({ "limit": limit, "offset": offset });

        self.fetch_result(Method::POST, &path, &query, Some(&body)).await
    }

    /// Global rank of specific accounts.
    pub async fn user_global_rank(&self, params: &UserGlobalRankParams) -> Result<Vec<Rank>> {
        let ids = params.identifiers()?;
        let strategy = params.strategy.unwrap_or_default();
        let path = format!(
            "/openrank/scores/global/{}/{}",
            strategy.as_str(),
            ids.kind().as_str()
        );

        self.fetch_result(Method::POST, &path, &[], Some(&ids)).await
    }

    // ==================== Graph ====================

    /// Personalized scores, or plain neighbors when `without_rank_score` is set.
    pub async fn personalized_neighbors(
        &self,
        params: &PersonalizedNeighborsParams,
    ) -> Result<Vec<Neighbor>> {
        params.validate()?;
        let kind = params.ids.kind().as_str();
        let prefix = if params.without_rank_score {
            "graph/neighbors"
        } else {
            "scores/personalized"
        };
        let strategy = params.strategy.unwrap_or_default();
        let path = format!("/openrank/{prefix}/{}/{kind}", strategy.as_str());

        let mut body = serde_json::Map::new();
        body.insert(kind.to_string(), serde_json::to_value(&params.ids)?);
        body.insert("k".to_string(), params.k().into());
        body.insert("limit".to_string(), params.limit().into());

        self.fetch_result(Method::POST, &path, &[], Some(&body)).await
    }

    /// Accounts directly linked to the input accounts.
    pub async fn direct_links(&self, params: &DirectLinksParams) -> Result<Vec<Neighbor>> {
        let ids = params.identifiers()?;
        let strategy = params.strategy.unwrap_or_default();
        let path = format!("/openrank/links/{}/{}", strategy.as_str(), ids.kind().as_str());
        let query = [("limit", params.limit().to_string())];

        self.fetch_result(Method::POST, &path, &query, Some(&ids)).await
    }

    // ==================== Metadata ====================

    pub async fn handles_by_addresses(
        &self,
        params: &HandlesByAddressesParams,
    ) -> Result<Vec<Neighbor>> {
        params.validate()?;
        self.fetch_result(Method::POST, "/openrank/metadata/handles", &[], Some(&params.addresses))
            .await
    }

    pub async fn addresses_by_handles(
        &self,
        params: &AddressesByHandlesParams,
    ) -> Result<Vec<Neighbor>> {
        params.validate()?;
        self.fetch_result(Method::POST, "/openrank/metadata/addresses", &[], Some(&params.handles))
            .await
    }

    // ==================== Frames ====================

    pub async fn frames_global(&self, params: &FramesGlobalParams) -> Result<Vec<Frame>> {
        self.fetch_result::<Frame, ()>(
            Method::POST,
            "/openrank/frames/global/rankings",
            &params.query_pairs(),
            None,
        )
        .await
    }

    pub async fn frames_personalized(
        &self,
        params: &FramesPersonalizedParams,
    ) -> Result<Vec<Frame>> {
        let ids = params.identifiers()?;
        let path = format!("/openrank/frames/personalized/rankings/{}", ids.kind().as_str());
        let query = params.frame_params().query_pairs(false);

        self.fetch_result(Method::POST, &path, &query, Some(&ids)).await
    }

    // ==================== Casts ====================

    /// One page of the latest-casts feed.
    pub async fn latest_casts(&self, params: &LatestCastsParams) -> Result<LatestCastsPage> {
        self.send::<_, ()>(Method::GET, "/casts/latest", &params.query_pairs(), None)
            .await
    }

    // ==================== Helper Methods ====================

    /// Send a request and unwrap the `result` envelope.
    async fn fetch_result<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let envelope: ResultEnvelope<T> = self.send(method, path, query, body).await?;
        Ok(envelope.result)
    }

    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, url = %url, "castkit request");

        let mut request = self.client.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Server { status, message });
        }

        let body = response.json().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use castkit_core::{IdentifierSet, ValidationError};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> OpenRankClient {
        OpenRankClient::new(ClientConfig {
            base_url: server.uri(),
            api_key: api_key.map(String::from),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn global_rankings_posts_paging_in_query_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openrank/scores/global/engagement/rankings"))
            .and(query_param("limit", "100"))
            .and(query_param("offset", "0"))
            .and(body_json(json!({ "limit": 100, "offset": 0 })))
            .and(header("authorization", "Bearer k3y"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{ "fid": 3, "fname": "dwr", "username": "dwr.eth",
                             "rank": 1, "score": 0.9, "percentile": 100 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ranks = client_for(&server, Some("k3y"))
            .global_rankings(&GlobalRankParams::default())
            .await
            .unwrap();
        assert_eq!(ranks.len(), 1);
        assert_eq!(ranks[0].fid, 3);
        assert_eq!(ranks[0].username.as_deref(), Some("dwr.eth"));
    }

    #[tokio::test]
    async fn neighbors_without_rank_score_use_graph_route() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openrank/graph/neighbors/following/handles"))
            .and(body_json(json!({ "handles": ["v"], "k": 3, "limit": 100 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{ "fid": 2, "fname": "v", "username": "v", "address": "0x1" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let neighbors = client_for(&server, None)
            .personalized_neighbors(&PersonalizedNeighborsParams {
                strategy: Some(castkit_core::GraphStrategy::Following),
                ids: IdentifierSet::Handles(vec!["v".into()]),
                without_rank_score: true,
                k: Some(3),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(neighbors[0].fid, Some(2));
        assert_eq!(neighbors[0].score, None);
    }

    #[tokio::test]
    async fn handles_by_addresses_posts_to_metadata_handles() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openrank/metadata/handles"))
            .and(body_json(json!(["0xabc"])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let accounts = client_for(&server, None)
            .handles_by_addresses(&HandlesByAddressesParams {
                addresses: vec!["0xabc".into()],
            })
            .await
            .unwrap();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn invalid_params_are_never_sent() {
        let server = MockServer::start().await;
        let client = client_for(&server, None);

        let err = client
            .direct_links(&DirectLinksParams {
                handles: Some(vec!["a".into()]),
                fids: Some(vec![1]),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::Ambiguous)
        ));

        let err = client
            .addresses_by_handles(&AddressesByHandlesParams::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::Missing { field: "handles" })
        ));

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_errors_carry_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openrank/frames/global/rankings"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "not found" })))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .frames_global(&FramesGlobalParams::default())
            .await
            .unwrap_err();
        match err {
            ClientError::Server { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn latest_casts_reads_next_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/casts/latest"))
            .and(query_param("cursor", "10"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "casts": [{ "hash": "0x01" }, { "hash": "0x02" }],
                "nextCursor": 12
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server, None)
            .latest_casts(&LatestCastsParams {
                cursor: Some(10),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.next_cursor, 12);
        assert_eq!(page.casts.len(), 2);
    }

    #[test]
    fn rejects_api_key_with_newline() {
        let result = OpenRankClient::new(ClientConfig {
            api_key: Some("bad\nkey".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(ClientError::InvalidApiKey(_))));
    }
}
