//! One-way client message bus and inbound command handling.

use crate::host::{ClientRegistry, HostRuntime};
use crate::messages::{Broadcast, ClientCommand};
use portico_core::Error;
use serde_json::Value;
use std::sync::Arc;

/// Tag registered when a client asks for a deferred sync.
const SYNC_TAG: &str = "sync-news";

/// Tag recognized by the periodic sync routing point.
const DAILY_NEWS_TAG: &str = "get-daily-news";

/// Broadcast channel to connected application instances.
///
/// Delivery targets the first instance per registry order; with no instance
/// connected the message is dropped, with no queue and no retry.
#[derive(Clone)]
pub struct ClientMessageBus {
    registry: Arc<dyn ClientRegistry>,
    host: Arc<dyn HostRuntime>,
}

impl ClientMessageBus {
    pub fn new(registry: Arc<dyn ClientRegistry>, host: Arc<dyn HostRuntime>) -> Self {
        Self { registry, host }
    }

    /// Deliver `message` to the first connected instance, if any.
    pub async fn broadcast(&self, message: &Broadcast) -> Result<(), Error> {
        let value = serde_json::to_value(message).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let clients = self.registry.connected().await;
        match clients.first() {
            Some(first) => {
                if let Err(e) = self.registry.post(&first.id, value).await {
                    tracing::warn!(client = %first.id, error = %e, "broadcast delivery failed");
                }
            }
            None => tracing::debug!("no connected client, message dropped"),
        }
        Ok(())
    }

    /// Handle one inbound command message from an application instance.
    ///
    /// Every inbound value, recognized or not, is echoed back tagged
    /// `receive`.
    pub async fn on_client_message(&self, value: Value) -> Result<(), Error> {
        match ClientCommand::parse(&value) {
            ClientCommand::SkipWaiting => self.host.skip_waiting().await?,
            ClientCommand::Update => self.host.check_for_update().await?,
            ClientCommand::Sync => {
                self.host.register_sync(SYNC_TAG).await?;
                tracing::info!(tag = SYNC_TAG, "sync registered");
            }
            ClientCommand::Unknown => tracing::debug!("unrecognized client command ignored"),
        }

        self.broadcast(&Broadcast::Receive { msg: value }).await
    }

    /// Route a periodic sync tag.
    ///
    /// `get-daily-news` is recognized but currently performs no action; this
    /// is the extension point for scheduled content refresh.
    pub fn on_periodic_sync(&self, tag: &str) {
        if tag == DAILY_NEWS_TAG {
            tracing::debug!(tag, "periodic sync tick");
        } else {
            tracing::debug!(tag, "unrecognized periodic sync tag");
        }
    }
}
