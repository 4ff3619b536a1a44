//! Entry CRUD operations.
//!
//! Provides functions for writing, reading, and enumerating cached
//! response snapshots inside one cache version.

use super::connection::CacheStore;
use super::hash::entry_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached response snapshot.
///
/// Represents one complete response as it was received from the network:
/// status, headers, and body bytes, keyed by the normalized request
/// descriptor it answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub key: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl Snapshot {
    /// Build a snapshot from a response, computing the cache key and
    /// stamping the storage time.
    pub fn of_response(method: &str, url: &str, status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            key: entry_key(method, url),
            method: method.to_string(),
            url: url.to_string(),
            status,
            headers,
            body,
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl CacheStore {
    /// Insert or update a cached entry under the given cache version.
    ///
    /// Uses UPSERT semantics: inserts if the (version, key) pair doesn't
    /// exist, overwrites the whole snapshot if it does.
    pub async fn put_entry(&self, version: &str, snapshot: &Snapshot) -> Result<(), Error> {
        let version = version.to_string();
        let snapshot = snapshot.clone();
        let headers_json = serde_json::to_string(&snapshot.headers)
            .map_err(|e| Error::InvalidInput(format!("unserializable headers: {e}")))?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (
                        version, key, method, url, status, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(version, key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        &version,
                        &snapshot.key,
                        &snapshot.method,
                        &snapshot.url,
                        snapshot.status as i64,
                        &headers_json,
                        &snapshot.body,
                        &snapshot.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get an entry by key from the given cache version.
    ///
    /// Returns None if the key doesn't exist in that version.
    pub async fn get_entry(&self, version: &str, key: &str) -> Result<Option<Snapshot>, Error> {
        let version = version.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Snapshot>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key, method, url, status, headers_json, body, stored_at
                     FROM entries WHERE version = ?1 AND key = ?2",
                )?;

                let result = stmt.query_row(params![version, key], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Vec<u8>>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                });

                match result {
                    Ok((key, method, url, status, headers_json, body, stored_at)) => {
                        let headers = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::InvalidInput(format!("corrupt headers_json: {e}")))?;
                        Ok(Some(Snapshot { key, method, url, status: status as u16, headers, body, stored_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Enumerate the entry keys stored under one cache version.
    pub async fn list_keys(&self, version: &str) -> Result<Vec<String>, Error> {
        let version = version.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT key FROM entries WHERE version = ?1 ORDER BY key")?;
                let keys = stmt
                    .query_map(params![version], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}
