//! Cache version enumeration and deletion.
//!
//! Versions exist implicitly: a version is present as long as at least one
//! entry row carries its name. Deleting a version removes every entry under
//! it — this is the only eviction mechanism in the system.

use super::connection::CacheStore;
use crate::Error;
use tokio_rusqlite::params;

impl CacheStore {
    /// Enumerate the cache version names currently present in the store.
    pub async fn list_versions(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT DISTINCT version FROM entries ORDER BY version")?;
                let versions = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(versions)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry under the given cache version.
    ///
    /// Returns the number of deleted entries.
    pub async fn delete_version(&self, version: &str) -> Result<u64, Error> {
        let version = version.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries WHERE version = ?1", params![version])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
