//! Persisted key/value configuration endpoint.
//!
//! Emulates a single-resource REST endpoint entirely out of the cache: one
//! JSON document stored under a reserved key inside the active cache
//! version. Whole-document replace, no partial merge, no history.

use crate::worker::WorkerState;
use portico_core::{Error, Snapshot, store::entry_key};
use serde_json::{Map, Value};

/// Reserved request path served from the cache instead of the network.
pub const CONFIG_PATH: &str = "/config";

/// The configuration blob store.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigEndpoint;

impl ConfigEndpoint {
    fn key() -> String {
        entry_key("GET", CONFIG_PATH)
    }

    /// Read the stored blob, or `{}` if none has ever been written.
    pub async fn get(&self, state: &WorkerState) -> Result<Value, Error> {
        match state.store.get_entry(&state.cache_name, &Self::key()).await? {
            Some(entry) => {
                serde_json::from_slice(&entry.body).map_err(|e| Error::InvalidInput(format!("corrupt config blob: {e}")))
            }
            None => Ok(Value::Object(Map::new())),
        }
    }

    /// Overwrite the blob entirely and unconditionally.
    ///
    /// The returned response body is always the literal `{}`, independent of
    /// what was stored.
    pub async fn set(&self, state: &WorkerState, value: &Value) -> Result<Value, Error> {
        let body = serde_json::to_vec(value).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let snapshot = Snapshot::of_response(
            "GET",
            CONFIG_PATH,
            200,
            vec![("content-type".to_string(), "application/json".to_string())],
            body,
        );
        state.store.put_entry(&state.cache_name, &snapshot).await?;
        Ok(Value::Object(Map::new()))
    }
}
