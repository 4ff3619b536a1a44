//! Wire shapes exchanged with application instances.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound message to an application instance, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Broadcast {
    /// A new cache version finished populating.
    Install,

    /// A cache version took over and stale versions were purged.
    Activate,

    /// Observability ping for a network fetch, independent of caching
    /// outcome.
    Fetch { url: String, method: String },

    /// Echo of an inbound client command, recognized or not.
    Receive { msg: Value },

    /// A raw push payload forwarded to a connected instance.
    Push { msg: Value },

    /// Notification data routed to the instance chosen on click.
    #[serde(rename = "clientList[0]")]
    ClientList { msg: Value },
}

/// Inbound command from an application instance: `{action: ...}`.
///
/// Anything else deserializes to `Unknown` and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ClientCommand {
    /// Force the lifecycle manager to activate immediately.
    SkipWaiting,

    /// Ask the host runtime to check for a new version.
    Update,

    /// Register a named deferred synchronization task.
    Sync,

    #[serde(other)]
    Unknown,
}

impl ClientCommand {
    /// Parse a raw inbound value. Unrecognized or malformed commands map to
    /// `Unknown` rather than an error.
    pub fn parse(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(ClientCommand::Unknown)
    }
}
