//! Push notification dispatch and click routing.

use crate::host::{ClientRegistry, HostRuntime, NotificationOptions};
use crate::messages::Broadcast;
use portico_core::Error;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

const DEFAULT_TITLE: &str = "New message";
const DEFAULT_BODY: &str = "You have a new message!";
const DEFAULT_ICON: &str = "/favicon/android-chrome-192x192.png";
const DEFAULT_BADGE: &str = "/favicon/favicon-32x32.png";
const DEFAULT_IMAGE: &str = "/img/push.jpg";

const FALLBACK_TITLE: &str = "error";
const FALLBACK_BODY: &str = "There was an error delivering this notification.";

const SUFFIX_FOCUSED: &str = " You're still here, thanks!";
const SUFFIX_CONNECTED: &str = " You haven't closed the page, click here to focus it!";
const SUFFIX_CLOSED: &str = " You have closed the page, click here to re-open it!";

/// Structured notification envelope carried by a push payload.
///
/// Producer-controlled and untrusted; every field is optional and falls back
/// to a fixed default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationEnvelope {
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub image: Option<String>,
    pub vibrate: Option<Vec<u32>>,
    pub data: Option<Value>,
}

impl NotificationEnvelope {
    /// The envelope displayed when the payload fails to parse.
    fn fallback() -> Self {
        Self {
            title: Some(FALLBACK_TITLE.to_string()),
            body: Some(FALLBACK_BODY.to_string()),
            ..Self::default()
        }
    }
}

/// Turns inbound push payloads into displayed notifications and routes
/// notification clicks back to the application.
pub struct NotificationDispatcher {
    registry: Arc<dyn ClientRegistry>,
    host: Arc<dyn HostRuntime>,
    landing_path: String,
}

impl NotificationDispatcher {
    pub fn new(registry: Arc<dyn ClientRegistry>, host: Arc<dyn HostRuntime>, landing_path: String) -> Self {
        Self { registry, host, landing_path }
    }

    /// Handle one inbound push payload.
    ///
    /// The raw payload is forwarded to every connected instance tagged
    /// `push` (best-effort), then displayed as a system notification whose
    /// body carries a suffix reflecting instance presence.
    pub async fn on_push(&self, raw: &str) -> Result<(), Error> {
        let clients = self.registry.connected().await;

        let forwarded = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        for client in &clients {
            let message = serde_json::to_value(Broadcast::Push { msg: forwarded.clone() })
                .map_err(|e| Error::InvalidInput(e.to_string()))?;
            if let Err(e) = self.registry.post(&client.id, message).await {
                tracing::warn!(client = %client.id, error = %e, "push forward failed");
            }
        }

        let focused = clients.iter().any(|client| client.focused);

        let envelope = match serde_json::from_str::<NotificationEnvelope>(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "push payload failed to parse, using fallback envelope");
                NotificationEnvelope::fallback()
            }
        };

        let suffix = if focused {
            SUFFIX_FOCUSED
        } else if !clients.is_empty() {
            SUFFIX_CONNECTED
        } else {
            SUFFIX_CLOSED
        };

        let mut body = envelope.body.unwrap_or_else(|| DEFAULT_BODY.to_string());
        body.push_str(suffix);

        let title = envelope.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let options = NotificationOptions {
            body,
            icon: envelope.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            badge: envelope.badge.unwrap_or_else(|| DEFAULT_BADGE.to_string()),
            image: envelope.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            vibrate: envelope.vibrate.unwrap_or_default(),
            data: envelope.data.unwrap_or(Value::Null),
        };

        self.host.show_notification(&title, &options).await
    }

    /// Handle a click on a displayed notification.
    ///
    /// The attached data is routed to the first connected instance, or to a
    /// freshly opened one when none is connected.
    pub async fn on_click(&self, id: &str, data: Option<Value>) -> Result<(), Error> {
        let data = data.unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        self.host.close_notification(id).await?;

        let clients = self.registry.connected().await;
        let message =
            serde_json::to_value(Broadcast::ClientList { msg: data }).map_err(|e| Error::InvalidInput(e.to_string()))?;

        if let Some(first) = clients.first() {
            self.registry.focus(&first.id).await?;
            return self.registry.post(&first.id, message).await;
        }

        match self.registry.open_window(&self.landing_path).await? {
            Some(client) => self.registry.post(&client.id, message).await,
            None => {
                tracing::warn!(path = %self.landing_path, "no window handle returned, notification data dropped");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ClientInfo;
    use crate::testutil::{FakeHost, FakeRegistry};
    use serde_json::json;

    fn dispatcher(clients: Vec<ClientInfo>) -> (NotificationDispatcher, Arc<FakeRegistry>, Arc<FakeHost>) {
        let registry = Arc::new(FakeRegistry::with_clients(clients));
        let host = Arc::new(FakeHost::default());
        let dispatcher = NotificationDispatcher::new(registry.clone(), host.clone(), "/profile".to_string());
        (dispatcher, registry, host)
    }

    fn client(id: &str, focused: bool) -> ClientInfo {
        ClientInfo { id: id.to_string(), focused }
    }

    #[tokio::test]
    async fn test_push_focused_suffix() {
        let (dispatcher, _, host) = dispatcher(vec![client("a", true)]);

        dispatcher.on_push(r#"{"body":"hi"}"#).await.unwrap();

        let notifications = host.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].1.body, format!("hi{SUFFIX_FOCUSED}"));
    }

    #[tokio::test]
    async fn test_push_connected_unfocused_suffix() {
        let (dispatcher, _, host) = dispatcher(vec![client("a", false), client("b", false)]);

        dispatcher.on_push(r#"{"body":"hi"}"#).await.unwrap();

        let notifications = host.notifications.lock().unwrap();
        assert!(notifications[0].1.body.ends_with(SUFFIX_CONNECTED));
    }

    #[tokio::test]
    async fn test_push_no_clients_suffix() {
        let (dispatcher, _, host) = dispatcher(Vec::new());

        dispatcher.on_push(r#"{"body":"hi"}"#).await.unwrap();

        let notifications = host.notifications.lock().unwrap();
        assert!(notifications[0].1.body.ends_with(SUFFIX_CLOSED));
    }

    #[tokio::test]
    async fn test_push_forwarded_to_every_client() {
        let (dispatcher, registry, _) = dispatcher(vec![client("a", false), client("b", true)]);

        dispatcher.on_push(r#"{"body":"hi"}"#).await.unwrap();

        let posted = registry.posted.lock().unwrap();
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[0].0, "a");
        assert_eq!(posted[1].0, "b");
        assert_eq!(posted[0].1, json!({"type": "push", "msg": {"body": "hi"}}));
    }

    #[tokio::test]
    async fn test_push_parse_failure_uses_fallback_envelope() {
        let (dispatcher, _, host) = dispatcher(Vec::new());

        dispatcher.on_push("not json at all").await.unwrap();

        let notifications = host.notifications.lock().unwrap();
        assert_eq!(notifications[0].0, FALLBACK_TITLE);
        assert!(notifications[0].1.body.starts_with(FALLBACK_BODY));
    }

    #[tokio::test]
    async fn test_push_field_defaults() {
        let (dispatcher, _, host) = dispatcher(Vec::new());

        dispatcher.on_push(r#"{"title":"t"}"#).await.unwrap();

        let notifications = host.notifications.lock().unwrap();
        let (title, options) = &notifications[0];
        assert_eq!(title, "t");
        assert!(options.body.starts_with(DEFAULT_BODY));
        assert_eq!(options.icon, DEFAULT_ICON);
        assert_eq!(options.badge, DEFAULT_BADGE);
        assert_eq!(options.image, DEFAULT_IMAGE);
        assert!(options.vibrate.is_empty());
    }

    #[tokio::test]
    async fn test_push_envelope_fields_respected() {
        let (dispatcher, _, host) = dispatcher(Vec::new());

        dispatcher
            .on_push(r#"{"title":"t","body":"b","icon":"/i.png","vibrate":[100,50,100]}"#)
            .await
            .unwrap();

        let notifications = host.notifications.lock().unwrap();
        let (title, options) = &notifications[0];
        assert_eq!(title, "t");
        assert_eq!(options.icon, "/i.png");
        assert_eq!(options.vibrate, vec![100, 50, 100]);
    }

    #[tokio::test]
    async fn test_click_with_connected_client_focuses_first() {
        let (dispatcher, registry, host) = dispatcher(vec![client("a", false), client("b", false)]);

        dispatcher.on_click("n1", Some(json!({"page": 2}))).await.unwrap();

        assert_eq!(host.calls.lock().unwrap().as_slice(), ["close_notification:n1"]);
        assert_eq!(registry.focused_calls.lock().unwrap().as_slice(), ["a"]);
        let posted = registry.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, "a");
        assert_eq!(posted[0].1, json!({"type": "clientList[0]", "msg": {"page": 2}}));
    }

    #[tokio::test]
    async fn test_click_without_clients_opens_window() {
        let (dispatcher, registry, _) = dispatcher(Vec::new());
        registry.open_returns(Some(client("new", true)));

        dispatcher.on_click("n1", None).await.unwrap();

        assert_eq!(registry.opened.lock().unwrap().as_slice(), ["/profile"]);
        let posted = registry.posted.lock().unwrap();
        assert_eq!(posted[0].0, "new");
        assert_eq!(posted[0].1, json!({"type": "clientList[0]", "msg": {}}));
    }

    #[tokio::test]
    async fn test_click_open_window_without_handle_is_ok() {
        let (dispatcher, registry, _) = dispatcher(Vec::new());

        dispatcher.on_click("n1", Some(json!({"x": 1}))).await.unwrap();

        assert_eq!(registry.opened.lock().unwrap().as_slice(), ["/profile"]);
        assert!(registry.posted.lock().unwrap().is_empty());
    }
}
