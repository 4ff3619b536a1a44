//! In-memory fakes for the host runtime, client registry, and network.

use crate::host::{ClientInfo, ClientRegistry, HostRuntime, NotificationOptions};
use crate::worker::WorkerState;
use async_trait::async_trait;
use portico_client::fetch::{FetchResponse, Fetcher};
use portico_core::{CacheStore, Error};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// A fresh in-memory state under `cache-v1`.
pub async fn worker_state() -> WorkerState {
    WorkerState {
        cache_name: "cache-v1".to_string(),
        store: CacheStore::open_in_memory().await.unwrap(),
    }
}

/// Fetcher serving canned responses by exact URL.
///
/// A URL with no canned response fails with a transport error, so tests can
/// assert that a code path never touches the network by leaving the fake
/// unconfigured.
#[derive(Default)]
pub struct FakeFetcher {
    pub responses: Mutex<HashMap<String, (u16, Vec<u8>)>>,
    pub requests: Mutex<Vec<(String, String)>>,
}

impl FakeFetcher {
    pub fn respond(&self, url: &str, status: u16, body: &[u8]) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.to_vec()));
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn send(&self, method: &str, url: &Url, _body: Option<Vec<u8>>) -> Result<FetchResponse, Error> {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), url.to_string()));

        let responses = self.responses.lock().unwrap();
        match responses.get(url.as_str()) {
            Some((status, body)) => Ok(FetchResponse {
                url: url.clone(),
                final_url: url.clone(),
                status: *status,
                headers: vec![("content-type".to_string(), "application/octet-stream".to_string())],
                bytes: body.clone().into(),
                fetch_ms: 1,
            }),
            None => Err(Error::HttpError(format!("network error: no route to {url}"))),
        }
    }
}

/// Host runtime recording every control call.
#[derive(Default)]
pub struct FakeHost {
    pub calls: Mutex<Vec<String>>,
    pub notifications: Mutex<Vec<(String, NotificationOptions)>>,
}

#[async_trait]
impl HostRuntime for FakeHost {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.calls.lock().unwrap().push("skip_waiting".to_string());
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), Error> {
        self.calls.lock().unwrap().push("claim_clients".to_string());
        Ok(())
    }

    async fn check_for_update(&self) -> Result<(), Error> {
        self.calls.lock().unwrap().push("check_for_update".to_string());
        Ok(())
    }

    async fn register_sync(&self, tag: &str) -> Result<(), Error> {
        self.calls.lock().unwrap().push(format!("register_sync:{tag}"));
        Ok(())
    }

    async fn show_notification(&self, title: &str, options: &NotificationOptions) -> Result<(), Error> {
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), options.clone()));
        Ok(())
    }

    async fn close_notification(&self, id: &str) -> Result<(), Error> {
        self.calls.lock().unwrap().push(format!("close_notification:{id}"));
        Ok(())
    }
}

/// Registry with a fixed roster, recording posts, focuses, and opens.
#[derive(Default)]
pub struct FakeRegistry {
    pub clients: Mutex<Vec<ClientInfo>>,
    pub posted: Mutex<Vec<(String, Value)>>,
    pub focused_calls: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<String>>,
    pub open_result: Mutex<Option<ClientInfo>>,
}

impl FakeRegistry {
    pub fn with_clients(clients: Vec<ClientInfo>) -> Self {
        Self { clients: Mutex::new(clients), ..Self::default() }
    }

    pub fn open_returns(&self, client: Option<ClientInfo>) {
        *self.open_result.lock().unwrap() = client;
    }
}

#[async_trait]
impl ClientRegistry for FakeRegistry {
    async fn connected(&self) -> Vec<ClientInfo> {
        self.clients.lock().unwrap().clone()
    }

    async fn post(&self, client_id: &str, message: Value) -> Result<(), Error> {
        self.posted.lock().unwrap().push((client_id.to_string(), message));
        Ok(())
    }

    async fn focus(&self, client_id: &str) -> Result<(), Error> {
        self.focused_calls.lock().unwrap().push(client_id.to_string());
        Ok(())
    }

    async fn open_window(&self, path: &str) -> Result<Option<ClientInfo>, Error> {
        self.opened.lock().unwrap().push(path.to_string());
        Ok(self.open_result.lock().unwrap().clone())
    }
}
