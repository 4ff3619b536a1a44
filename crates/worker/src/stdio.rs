//! Line-delimited JSON transport adapter.
//!
//! Events arrive as one JSON object per stdin line; every side effect the
//! agent requests from its host runtime goes out as one JSON object per
//! stdout line, tagged by `effect`. Logging goes to stderr so stdout stays a
//! clean protocol channel.

use crate::events::WorkerEvent;
use crate::host::{ClientInfo, ClientRegistry, HostRuntime, NotificationOptions};
use crate::worker::Worker;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use portico_core::{Error, Snapshot};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// One outbound effect line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum Effect {
    FetchResult {
        url: String,
        status: u16,
        headers: Vec<(String, String)>,
        /// Base64-encoded body bytes.
        body: String,
    },
    FetchError {
        url: String,
        error: String,
    },
    PostMessage {
        client_id: String,
        message: Value,
    },
    ShowNotification {
        title: String,
        options: NotificationOptions,
    },
    CloseNotification {
        id: String,
    },
    Focus {
        client_id: String,
    },
    OpenWindow {
        path: String,
    },
    SkipWaiting,
    ClaimClients,
    CheckForUpdate,
    RegisterSync {
        tag: String,
    },
}

impl Effect {
    fn fetch_result(snapshot: &Snapshot) -> Self {
        Effect::FetchResult {
            url: snapshot.url.clone(),
            status: snapshot.status,
            headers: snapshot.headers.clone(),
            body: STANDARD.encode(&snapshot.body),
        }
    }
}

/// Host runtime and client registry speaking line-delimited JSON on stdout.
///
/// The roster is whatever the most recent `clients` event declared. The
/// channel is one-way, so `open_window` can only request the window; it
/// never yields a handle.
pub struct StdioHost {
    roster: Mutex<Vec<ClientInfo>>,
    out: tokio::sync::Mutex<tokio::io::Stdout>,
}

impl StdioHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { roster: Mutex::new(Vec::new()), out: tokio::sync::Mutex::new(tokio::io::stdout()) })
    }

    pub fn set_roster(&self, clients: Vec<ClientInfo>) {
        *self.roster.lock().unwrap_or_else(|e| e.into_inner()) = clients;
    }

    async fn emit(&self, effect: &Effect) -> Result<(), Error> {
        let mut line = serde_json::to_vec(effect).map_err(|e| Error::Host(e.to_string()))?;
        line.push(b'\n');
        let mut out = self.out.lock().await;
        out.write_all(&line).await.map_err(|e| Error::Host(e.to_string()))?;
        out.flush().await.map_err(|e| Error::Host(e.to_string()))
    }
}

#[async_trait]
impl ClientRegistry for StdioHost {
    async fn connected(&self) -> Vec<ClientInfo> {
        self.roster.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn post(&self, client_id: &str, message: Value) -> Result<(), Error> {
        self.emit(&Effect::PostMessage { client_id: client_id.to_string(), message }).await
    }

    async fn focus(&self, client_id: &str) -> Result<(), Error> {
        self.emit(&Effect::Focus { client_id: client_id.to_string() }).await
    }

    async fn open_window(&self, path: &str) -> Result<Option<ClientInfo>, Error> {
        self.emit(&Effect::OpenWindow { path: path.to_string() }).await?;
        Ok(None)
    }
}

#[async_trait]
impl HostRuntime for StdioHost {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.emit(&Effect::SkipWaiting).await
    }

    async fn claim_clients(&self) -> Result<(), Error> {
        self.emit(&Effect::ClaimClients).await
    }

    async fn check_for_update(&self) -> Result<(), Error> {
        self.emit(&Effect::CheckForUpdate).await
    }

    async fn register_sync(&self, tag: &str) -> Result<(), Error> {
        self.emit(&Effect::RegisterSync { tag: tag.to_string() }).await
    }

    async fn show_notification(&self, title: &str, options: &NotificationOptions) -> Result<(), Error> {
        self.emit(&Effect::ShowNotification { title: title.to_string(), options: options.clone() })
            .await
    }

    async fn close_notification(&self, id: &str) -> Result<(), Error> {
        self.emit(&Effect::CloseNotification { id: id.to_string() }).await
    }
}

/// Drive the worker from stdin until it closes.
///
/// One event is handled to completion before the next line is read,
/// matching the single-threaded cooperative scheduler of the host runtime.
pub async fn serve(worker: &Worker, host: Arc<StdioHost>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: WorkerEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable event line");
                continue;
            }
        };

        if let WorkerEvent::Clients { clients } = &event {
            host.set_roster(clients.clone());
            continue;
        }

        let fetch_url = match &event {
            WorkerEvent::Fetch(request) => Some(request.url.clone()),
            _ => None,
        };

        match worker.handle(event).await {
            Ok(Some(snapshot)) => host.emit(&Effect::fetch_result(&snapshot)).await?,
            Ok(None) => {}
            Err(e) => match fetch_url {
                // A failed retrieval surfaces to the requester unchanged.
                Some(url) => host.emit(&Effect::FetchError { url, error: e.to_string() }).await?,
                None => tracing::error!(error = %e, "event handling failed"),
            },
        }
    }

    Ok(())
}
