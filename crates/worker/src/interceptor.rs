//! Request interception and caching policy engine.
//!
//! Every outbound request from an application instance lands here. Three
//! outcomes: served from the cache, passed through to the network, or
//! fetched and conditionally cached.

use crate::bus::ClientMessageBus;
use crate::config_endpoint::{CONFIG_PATH, ConfigEndpoint};
use crate::events::FetchRequest;
use crate::messages::Broadcast;
use crate::worker::WorkerState;
use portico_client::fetch::{Fetcher, normalize};
use portico_client::policy::{CacheDecision, CachePolicy};
use portico_core::{Error, Snapshot, store::entry_key};
use std::sync::Arc;

pub struct FetchInterceptor {
    fetcher: Arc<dyn Fetcher>,
    bus: ClientMessageBus,
    config: ConfigEndpoint,
    policy: CachePolicy,
}

impl FetchInterceptor {
    pub fn new(fetcher: Arc<dyn Fetcher>, bus: ClientMessageBus, policy: CachePolicy) -> Self {
        Self { fetcher, bus, config: ConfigEndpoint, policy }
    }

    /// Intercept one request and produce its response.
    ///
    /// - The reserved configuration path is served entirely out of the
    ///   cache; the network is never touched.
    /// - Mutating methods pass through to the network unmodified.
    /// - Retrieval requests are answered cache-first; misses are fetched and
    ///   stored when the eligibility policy allows.
    pub async fn intercept(&self, state: &WorkerState, request: &FetchRequest) -> Result<Snapshot, Error> {
        let url = normalize(&request.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        if url.path() == CONFIG_PATH {
            return self.config_response(state, request).await;
        }

        if !request.method.eq_ignore_ascii_case("GET") {
            let response = self.fetcher.send(&request.method, &url, request.body.clone()).await?;
            return Ok(response.to_snapshot(&request.method));
        }

        let key = entry_key("GET", url.as_str());
        if let Some(entry) = state.store.get_entry(&state.cache_name, &key).await? {
            tracing::debug!(url = %url, "cache hit");
            return Ok(entry);
        }

        let response = self.fetcher.send("GET", &url, None).await?;

        self.bus
            .broadcast(&Broadcast::Fetch { url: url.to_string(), method: "GET".to_string() })
            .await?;

        let snapshot = response.to_snapshot("GET");
        match self.policy.decide(url.as_str()) {
            CacheDecision::Store => {
                state.store.put_entry(&state.cache_name, &snapshot).await?;
                tracing::debug!(url = %url, "response cached");
            }
            CacheDecision::Bypass(reason) => {
                tracing::debug!(url = %url, ?reason, "response not cached");
            }
        }

        Ok(snapshot)
    }

    /// Serve the reserved path from the config store. Any method other than
    /// POST is a read.
    async fn config_response(&self, state: &WorkerState, request: &FetchRequest) -> Result<Snapshot, Error> {
        let body = if request.method.eq_ignore_ascii_case("POST") {
            match serde_json::from_slice::<serde_json::Value>(request.body.as_deref().unwrap_or(b"")) {
                Ok(value) => self.config.set(state, &value).await?,
                Err(e) => {
                    // The write is skipped but the caller still gets {}.
                    tracing::warn!(error = %e, "config write body is not JSON");
                    serde_json::Value::Object(serde_json::Map::new())
                }
            }
        } else {
            self.config.get(state).await?
        };

        let bytes = serde_json::to_vec(&body).map_err(|e| Error::InvalidInput(e.to_string()))?;
        Ok(Snapshot::of_response(
            &request.method,
            &request.url,
            200,
            vec![("content-type".to_string(), "application/json".to_string())],
            bytes,
        ))
    }
}
