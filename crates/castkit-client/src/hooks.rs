//! Refreshing query handles.
//!
//! A [`Hook`] owns one set of parameters and keeps the latest result for them
//! in a [`watch`] channel. Changing the parameters starts a new fetch; a
//! response is applied only if it belongs to the most recent fetch and the
//! hook is still alive, so a slow stale response never overwrites a newer one.
//! Superseded requests are not cancelled, their results are dropped.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::client::OpenRankClient;
use crate::error::Result;
use crate::params::*;
use crate::types::{Frame, Neighbor, Rank};

/// Snapshot of a hook: a loading flag plus the current items.
///
/// `items` is empty until the first fetch resolves and after a failed fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct HookState<T> {
    pub is_loading: bool,
    pub items: Vec<T>,
}

impl<T> Default for HookState<T> {
    fn default() -> Self {
        Self {
            is_loading: true,
            items: Vec::new(),
        }
    }
}

/// Parameters that can drive a [`Hook`].
pub trait HookQuery: Clone + Serialize + Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Reject parameters that must not be sent.
    fn validate(&self) -> Result<()>;

    fn fetch(
        &self,
        client: &OpenRankClient,
    ) -> impl Future<Output = Result<Vec<Self::Item>>> + Send;
}

struct Shared<T> {
    alive: AtomicBool,
    /// Sequence number of the most recently issued fetch.
    latest: AtomicU64,
    state: watch::Sender<HookState<T>>,
}

impl<T> Shared<T> {
    /// Issue the next sequence number and mark the hook as loading.
    fn begin(&self) -> u64 {
        let mut seq = 0;
        self.state.send_modify(|state| {
            seq = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
            state.is_loading = true;
        });
        seq
    }

    /// Apply a fetch result if `seq` is still current. Returns whether it was applied.
    fn complete(&self, seq: u64, result: Result<Vec<T>>) -> bool {
        let mut result = Some(result);
        self.state.send_if_modified(|state| {
            if !self.alive.load(Ordering::Acquire) || self.latest.load(Ordering::Acquire) != seq {
                return false;
            }
            state.items = match result.take() {
                Some(Ok(items)) => items,
                Some(Err(err)) => {
                    tracing::warn!(seq, error = %err, "hook fetch failed");
                    Vec::new()
                }
                None => Vec::new(),
            };
            state.is_loading = false;
            true
        })
    }
}

/// A refreshing query handle.
///
/// Must be created and updated inside a tokio runtime: each fetch runs on its
/// own spawned task.
pub struct Hook<Q: HookQuery> {
    client: OpenRankClient,
    params: Q,
    fingerprint: String,
    shared: Arc<Shared<Q::Item>>,
}

impl<Q: HookQuery> Hook<Q> {
    /// Validate `params` and start the first fetch.
    pub fn new(client: OpenRankClient, params: Q) -> Result<Self> {
        params.validate()?;
        let fingerprint = serde_json::to_string(&params)?;
        let (state, _) = watch::channel(HookState::default());

        let hook = Self {
            client,
            params,
            fingerprint,
            shared: Arc::new(Shared {
                alive: AtomicBool::new(true),
                latest: AtomicU64::new(0),
                state,
            }),
        };
        hook.spawn_fetch();
        Ok(hook)
    }

    pub fn params(&self) -> &Q {
        &self.params
    }

    /// Current snapshot.
    pub fn state(&self) -> HookState<Q::Item> {
        self.shared.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<HookState<Q::Item>> {
        self.shared.state.subscribe()
    }

    /// Replace the parameters. Fetches again only when their serialized form
    /// changed; returns whether a fetch was started.
    pub fn set_params(&mut self, params: Q) -> Result<bool> {
        params.validate()?;
        let fingerprint = serde_json::to_string(&params)?;
        if fingerprint == self.fingerprint {
            return Ok(false);
        }

        self.params = params;
        self.fingerprint = fingerprint;
        self.spawn_fetch();
        Ok(true)
    }

    /// Fetch again with the current parameters.
    pub fn refresh(&self) {
        self.spawn_fetch();
    }

    fn spawn_fetch(&self) {
        let seq = self.shared.begin();
        let shared = Arc::clone(&self.shared);
        let client = self.client.clone();
        let params = self.params.clone();

        tokio::spawn(async move {
            let result = params.fetch(&client).await;
            if !shared.complete(seq, result) {
                tracing::debug!(seq, "discarding superseded hook response");
            }
        });
    }
}

impl<Q: HookQuery> Drop for Hook<Q> {
    fn drop(&mut self) {
        self.shared.alive.store(false, Ordering::Release);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Queries
// ═══════════════════════════════════════════════════════════════════════════

pub type GlobalRank = Hook<GlobalRankParams>;
pub type UserGlobalRank = Hook<UserGlobalRankParams>;
pub type PersonalizedNeighbors = Hook<PersonalizedNeighborsParams>;
pub type HandlesByAddresses = Hook<HandlesByAddressesParams>;
pub type AddressesByHandles = Hook<AddressesByHandlesParams>;
pub type DirectLinks = Hook<DirectLinksParams>;
pub type FramesGlobal = Hook<FramesGlobalParams>;
pub type FramesPersonalized = Hook<FramesPersonalizedParams>;
pub type LatestCasts = Hook<LatestCastsParams>;

impl HookQuery for GlobalRankParams {
    type Item = Rank;

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    async fn fetch(&self, client: &OpenRankClient) -> Result<Vec<Rank>> {
        client.global_rankings(self).await
    }
}

impl HookQuery for UserGlobalRankParams {
    type Item = Rank;

    fn validate(&self) -> Result<()> {
        self.identifiers()?;
        Ok(())
    }

    async fn fetch(&self, client: &OpenRankClient) -> Result<Vec<Rank>> {
        client.user_global_rank(self).await
    }
}

impl HookQuery for PersonalizedNeighborsParams {
    type Item = Neighbor;

    fn validate(&self) -> Result<()> {
        Ok(PersonalizedNeighborsParams::validate(self)?)
    }

    async fn fetch(&self, client: &OpenRankClient) -> Result<Vec<Neighbor>> {
        client.personalized_neighbors(self).await
    }
}

impl HookQuery for HandlesByAddressesParams {
    type Item = Neighbor;

    fn validate(&self) -> Result<()> {
        Ok(HandlesByAddressesParams::validate(self)?)
    }

    async fn fetch(&self, client: &OpenRankClient) -> Result<Vec<Neighbor>> {
        client.handles_by_addresses(self).await
    }
}

impl HookQuery for AddressesByHandlesParams {
    type Item = Neighbor;

    fn validate(&self) -> Result<()> {
        Ok(AddressesByHandlesParams::validate(self)?)
    }

    async fn fetch(&self, client: &OpenRankClient) -> Result<Vec<Neighbor>> {
        client.addresses_by_handles(self).await
    }
}

impl HookQuery for DirectLinksParams {
    type Item = Neighbor;

    fn validate(&self) -> Result<()> {
        self.identifiers()?;
        Ok(())
    }

    async fn fetch(&self, client: &OpenRankClient) -> Result<Vec<Neighbor>> {
        client.direct_links(self).await
    }
}

impl HookQuery for FramesGlobalParams {
    type Item = Frame;

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    async fn fetch(&self, client: &OpenRankClient) -> Result<Vec<Frame>> {
        client.frames_global(self).await
    }
}

impl HookQuery for FramesPersonalizedParams {
    type Item = Frame;

    fn validate(&self) -> Result<()> {
        self.identifiers()?;
        Ok(())
    }

    async fn fetch(&self, client: &OpenRankClient) -> Result<Vec<Frame>> {
        client.frames_personalized(self).await
    }
}

impl HookQuery for LatestCastsParams {
    type Item = Value;

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    async fn fetch(&self, client: &OpenRankClient) -> Result<Vec<Value>> {
        Ok(client.latest_casts(self).await?.casts)
    }
}
