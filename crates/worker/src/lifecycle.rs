//! Cache version lifecycle: install and activate.
//!
//! Both transitions are triggered by the host runtime, never by this
//! component. Install populates the new version from the asset manifest;
//! activate purges every other version and takes control of connected
//! clients.

use crate::bus::ClientMessageBus;
use crate::host::HostRuntime;
use crate::messages::Broadcast;
use crate::worker::WorkerState;
use portico_client::fetch::Fetcher;
use portico_core::Error;
use std::sync::Arc;
use url::Url;

pub struct CacheLifecycleManager {
    fetcher: Arc<dyn Fetcher>,
    bus: ClientMessageBus,
    host: Arc<dyn HostRuntime>,
    origin: String,
    assets: Vec<String>,
}

impl CacheLifecycleManager {
    pub fn new(
        fetcher: Arc<dyn Fetcher>, bus: ClientMessageBus, host: Arc<dyn HostRuntime>, origin: String,
        assets: Vec<String>,
    ) -> Self {
        Self { fetcher, bus, host, origin, assets }
    }

    /// Populate the deployment's cache version with every manifest asset.
    ///
    /// Atomic-or-failed: if any single asset fails to fetch and store, the
    /// partially populated version is purged and the error propagates, so no
    /// version is ever left half-ready.
    pub async fn install(&self, state: &WorkerState) -> Result<(), Error> {
        tracing::info!(cache = %state.cache_name, assets = self.assets.len(), "installing");

        if let Err(e) = self.populate(state).await {
            if let Err(purge_err) = state.store.delete_version(&state.cache_name).await {
                tracing::error!(cache = %state.cache_name, error = %purge_err, "failed to purge partial install");
            }
            return Err(Error::InstallFailed(e.to_string()));
        }

        self.bus.broadcast(&Broadcast::Install).await?;
        self.host.skip_waiting().await
    }

    async fn populate(&self, state: &WorkerState) -> Result<(), Error> {
        let base = Url::parse(&self.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        for path in &self.assets {
            let url = base.join(path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;
            let response = self.fetcher.get_ok(&url).await?;
            state.store.put_entry(&state.cache_name, &response.to_snapshot("GET")).await?;
        }
        Ok(())
    }

    /// Purge every cache version other than the current deployment's, then
    /// take control of connected clients.
    ///
    /// A deletion failure is fatal for that version only; remaining
    /// deletions continue.
    pub async fn activate(&self, state: &WorkerState) -> Result<(), Error> {
        for version in state.store.list_versions().await? {
            if version == state.cache_name {
                continue;
            }
            match state.store.delete_version(&version).await {
                Ok(entries) => tracing::info!(%version, entries, "purged stale cache version"),
                Err(e) => tracing::error!(%version, error = %e, "failed to delete cache version"),
            }
        }

        self.bus.broadcast(&Broadcast::Activate).await?;
        self.host.claim_clients().await
    }
}
