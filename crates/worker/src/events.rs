//! Inbound event surface.
//!
//! The host runtime raises named lifecycle/request/push events; each is
//! routed to exactly one component. On the stdio channel an event is one
//! JSON line tagged by `event`.

use crate::host::ClientInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An intercepted outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub method: String,
    pub url: String,

    /// Request body, base64-encoded on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_opt")]
    pub body: Option<Vec<u8>>,
}

impl FetchRequest {
    /// A bodyless GET for `url`.
    pub fn get(url: &str) -> Self {
        Self { method: "GET".to_string(), url: url.to_string(), body: None }
    }
}

/// One event raised by the host runtime.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum WorkerEvent {
    /// Populate the cache version for the current deployment.
    Install,

    /// Purge stale versions and take control of connected clients.
    Activate,

    /// An application instance issued a request.
    Fetch(FetchRequest),

    /// A push payload arrived; `data` is the raw, untrusted payload text.
    Push { data: String },

    /// The user clicked a displayed notification.
    NotificationClick {
        id: String,
        #[serde(default)]
        data: Option<Value>,
    },

    /// A periodic sync tag fired.
    PeriodicSync { tag: String },

    /// An application instance sent a command message.
    Message { data: Value },

    /// Roster update from the transport adapter: the current set of
    /// connected instances.
    Clients { clients: Vec<ClientInfo> },
}

pub(crate) mod base64_opt {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom))
            .transpose()
    }
}
