//! Event dispatch and process-wide state.

use crate::bus::ClientMessageBus;
use crate::events::WorkerEvent;
use crate::host::{ClientRegistry, HostRuntime};
use crate::interceptor::FetchInterceptor;
use crate::lifecycle::CacheLifecycleManager;
use crate::notify::NotificationDispatcher;
use portico_client::fetch::Fetcher;
use portico_client::policy::CachePolicy;
use portico_core::{AppConfig, CacheStore, Error, Snapshot};
use std::sync::Arc;

/// Process-wide mutable state, passed explicitly to every handler.
#[derive(Clone)]
pub struct WorkerState {
    /// The active cache version name (`cache-<version>`).
    pub cache_name: String,

    /// The shared versioned store.
    pub store: CacheStore,
}

/// The agent: routes each host-runtime event to exactly one component.
pub struct Worker {
    state: WorkerState,
    interceptor: FetchInterceptor,
    lifecycle: CacheLifecycleManager,
    dispatcher: NotificationDispatcher,
    bus: ClientMessageBus,
}

impl Worker {
    pub fn new(
        config: &AppConfig, store: CacheStore, fetcher: Arc<dyn Fetcher>, host: Arc<dyn HostRuntime>,
        registry: Arc<dyn ClientRegistry>,
    ) -> Self {
        let state = WorkerState { cache_name: config.cache_name(), store };
        let bus = ClientMessageBus::new(registry.clone(), host.clone());
        let policy = CachePolicy::new(config.allow_substrings.clone(), config.deny_substrings.clone());

        let interceptor = FetchInterceptor::new(fetcher.clone(), bus.clone(), policy);
        let lifecycle = CacheLifecycleManager::new(
            fetcher,
            bus.clone(),
            host.clone(),
            config.origin.clone(),
            config.assets.clone(),
        );
        let dispatcher = NotificationDispatcher::new(registry, host, config.landing_path.clone());

        Self { state, interceptor, lifecycle, dispatcher, bus }
    }

    /// Handle one event to completion.
    ///
    /// Only `fetch` produces a response; every other event returns `None`.
    pub async fn handle(&self, event: WorkerEvent) -> Result<Option<Snapshot>, Error> {
        match event {
            WorkerEvent::Install => self.lifecycle.install(&self.state).await.map(|()| None),
            WorkerEvent::Activate => self.lifecycle.activate(&self.state).await.map(|()| None),
            WorkerEvent::Fetch(request) => self.interceptor.intercept(&self.state, &request).await.map(Some),
            WorkerEvent::Push { data } => self.dispatcher.on_push(&data).await.map(|()| None),
            WorkerEvent::NotificationClick { id, data } => self.dispatcher.on_click(&id, data).await.map(|()| None),
            WorkerEvent::PeriodicSync { tag } => {
                self.bus.on_periodic_sync(&tag);
                Ok(None)
            }
            WorkerEvent::Message { data } => self.bus.on_client_message(data).await.map(|()| None),
            // Roster updates belong to the transport adapter, not to any
            // component.
            WorkerEvent::Clients { .. } => Ok(None),
        }
    }

    pub fn state(&self) -> &WorkerState {
        &self.state
    }
}
