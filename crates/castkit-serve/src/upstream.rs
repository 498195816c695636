//! Upstream forwarder for the OpenRank APIs.
//!
//! Builds an outbound request from already-normalized parameters, sends it
//! once, and relays whatever upstream answers. There is no retry and no
//! timeout: a hung upstream holds the inbound request open.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use castkit_core::IdentifierSet;
use castkit_core::metrics;
use reqwest::{Method, Url};

use crate::error::ApiError;

/// Which OpenRank host a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    /// Ranking API (`/rankings`, `/ranking_index`).
    Api,
    /// Graph API (links, neighbors, scores, metadata, frames).
    Graph,
}

/// Parsed base URLs of the two upstream hosts.
#[derive(Debug, Clone)]
pub struct UpstreamHosts {
    api: Url,
    graph: Url,
}

impl UpstreamHosts {
    pub fn parse(api: &str, graph: &str) -> anyhow::Result<Self> {
        Ok(Self {
            api: Url::parse(api)?,
            graph: Url::parse(graph)?,
        })
    }

    fn base(&self, host: Host) -> &Url {
        match host {
            Host::Api => &self.api,
            Host::Graph => &self.graph,
        }
    }
}

/// A fully normalized outbound call.
///
/// This is a plain value: the same fields always render the same URL and body.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub host: Host,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<IdentifierSet>,
}

impl OutboundRequest {
    pub fn get(host: Host, path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            host,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(host: Host, path: impl Into<String>, ids: IdentifierSet) -> Self {
        Self {
            method: Method::POST,
            host,
            path: path.into(),
            query: Vec::new(),
            body: Some(ids),
        }
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (&'static str, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Render the absolute URL against the configured hosts.
    pub fn url(&self, hosts: &UpstreamHosts) -> Url {
        let mut url = hosts.base(self.host).clone();
        let path = format!("{}{}", url.path().trim_end_matches('/'), self.path);
        url.set_path(&path);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        url
    }
}

/// Upstream status and JSON body, relayed to the caller unchanged.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// HTTP client bound to the configured OpenRank hosts.
#[derive(Clone)]
pub struct Upstream {
    client: reqwest::Client,
    hosts: Arc<UpstreamHosts>,
}

impl Upstream {
    pub fn new(hosts: UpstreamHosts) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            hosts: Arc::new(hosts),
        })
    }

    pub fn hosts(&self) -> &UpstreamHosts {
        &self.hosts
    }

    /// Send `request` once and relay the answer.
    ///
    /// Any upstream status is relayed as-is. Transport failures and non-JSON
    /// bodies become [`ApiError::Upstream`], tagged with `route`.
    pub async fn forward(
        &self,
        route: &'static str,
        request: OutboundRequest,
        authorization: HeaderValue,
    ) -> Result<UpstreamResponse, ApiError> {
        let url = request.url(&self.hosts);
        tracing::debug!(route, method = %request.method, url = %url, "forwarding to upstream");

        let mut builder = self
            .client
            .request(request.method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, authorization);
        if let Some(ids) = &request.body {
            builder = builder.json(ids);
        }

        let started = Instant::now();
        let result = async {
            let response = builder.send().await?;
            let status = response.status();
            let body = response.json::<serde_json::Value>().await?;
            Ok::<_, reqwest::Error>(UpstreamResponse { status, body })
        }
        .await;
        metrics::record_upstream_duration(route, started.elapsed());

        match result {
            Ok(relayed) => {
                metrics::record_upstream(route, relayed.status.as_u16());
                if !relayed.status.is_success() {
                    tracing::debug!(route, status = %relayed.status, "relaying upstream error");
                }
                Ok(relayed)
            }
            Err(source) => {
                metrics::record_upstream_failure(route);
                Err(ApiError::Upstream { route, source })
            }
        }
    }
}
