use redis::AsyncCommands;
use serde::Serialize;

use crate::error::Result;

/// Append-only persistence plane (§4.1): `XADD` for O(1) append, `XRANGE`
/// for O(k) range-read, `MAXLEN ~` trimming so each stream stays bounded.
#[derive(Clone)]
pub struct StreamStore {
    manager: redis::aio::ConnectionManager,
}

impl StreamStore {
    #[must_use]
    pub fn new(manager: redis::aio::ConnectionManager) -> Self {
        Self { manager }
    }

    pub async fn append<T: Serialize>(&self, stream_key: &str, maxlen: usize, entry: &T) -> Result<String> {
        let body = serde_json::to_string(entry)?;
        let mut conn = self.manager.clone();
        let id: String = redis::cmd("XADD")
            .arg(stream_key)
            .arg("MAXLEN")
            .arg("~")
            .arg(maxlen)
            .arg("*")
            .arg("entry")
            .arg(body)
            .query_async(&mut conn)
            .await?;
        Ok(id)
    }

    /// Range-read the last `count` entries (newest last), as raw JSON bodies.
    pub async fn range_latest(&self, stream_key: &str, count: usize) -> Result<Vec<String>> {
        let mut conn = self.manager.clone();
        let entries: Vec<(String, Vec<(String, String)>)> = conn
            .xrevrange_count(stream_key, "+", "-", count)
            .await?;
        Ok(entries
            .into_iter()
            .rev()
            .filter_map(|(_, fields)| {
                fields
                    .into_iter()
                    .find(|(k, _)| k == "entry")
                    .map(|(_, v)| v)
            })
            .collect())
    }
}
