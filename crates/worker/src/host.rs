//! Host runtime and client registry boundaries.
//!
//! The agent never owns its clients or its own lifecycle: both belong to the
//! host runtime that drives it. These traits are the seam between the
//! components and that runtime; the stdio adapter implements them for real,
//! tests implement them in memory.

use async_trait::async_trait;
use portico_core::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A connected application instance, as reported by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Opaque instance identifier.
    pub id: String,

    /// Whether the instance currently reports itself focused.
    #[serde(default)]
    pub focused: bool,
}

/// Display options for a system notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub image: String,
    pub vibrate: Vec<u32>,
    pub data: Value,
}

/// Live set of connected application instances.
///
/// Queried, never persisted: the roster is whatever the host runtime reports
/// at the moment of the query. Ordering is arbitrary but stable within one
/// query.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// All currently connected instances, in registry order.
    async fn connected(&self) -> Vec<ClientInfo>;

    /// Deliver a message to one instance.
    async fn post(&self, client_id: &str, message: Value) -> Result<(), Error>;

    /// Bring one instance into focus.
    async fn focus(&self, client_id: &str) -> Result<(), Error>;

    /// Ask the host runtime to open a new instance at `path`.
    ///
    /// The runtime may not return a usable handle; callers must cope with
    /// `None`.
    async fn open_window(&self, path: &str) -> Result<Option<ClientInfo>, Error>;
}

/// Control surface the host runtime exposes back to the agent.
#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Bypass the normal waiting period and activate immediately.
    async fn skip_waiting(&self) -> Result<(), Error>;

    /// Take control of all already-connected instances.
    async fn claim_clients(&self) -> Result<(), Error>;

    /// Ask the runtime to check for a new deployment version.
    async fn check_for_update(&self) -> Result<(), Error>;

    /// Register a named deferred synchronization task.
    async fn register_sync(&self, tag: &str) -> Result<(), Error>;

    /// Display a system notification.
    async fn show_notification(&self, title: &str, options: &NotificationOptions) -> Result<(), Error>;

    /// Close a displayed notification.
    async fn close_notification(&self, id: &str) -> Result<(), Error>;
}
