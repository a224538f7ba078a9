//! Networked store backed by Redis
//!
//! Values travel as text. A `nil` reply is an absent key; transport failures
//! are `StoreError::Connection`, never `Ok(None)`.

use super::{KeyValueStore, StoreError};
use crate::config::settings::{DEFAULT_REDIS_URL, DEFAULT_SCAN_BATCH};
use async_trait::async_trait;
use redis::aio::{ConnectionLike, MultiplexedConnection};
use redis::{AsyncCommands, RedisError};

const BACKEND: &str = "redis";

pub struct RedisStore {
    url: String,
    scan_batch: usize,
    conn: Option<MultiplexedConnection>,
}

impl RedisStore {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), scan_batch: DEFAULT_SCAN_BATCH, conn: None }
    }

    /// `COUNT` hint for each `SCAN` page.
    pub fn scan_batch(mut self, batch: usize) -> Self {
        self.scan_batch = batch.max(1);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_started(&self) -> bool {
        self.conn.is_some()
    }

    // Multiplexed handles are cheap clones over one socket.
    fn connection(&self) -> Result<MultiplexedConnection, StoreError> {
        self.conn.clone().ok_or(StoreError::NotStarted { backend: BACKEND })
    }
}

impl Default for RedisStore {
    fn default() -> Self {
        Self::new(DEFAULT_REDIS_URL)
    }
}

fn map_err(err: RedisError) -> StoreError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        StoreError::connection(BACKEND, err)
    } else {
        StoreError::Backend { backend: BACKEND, message: err.to_string() }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn start(&mut self) -> Result<(), StoreError> {
        if self.conn.is_some() {
            return Ok(());
        }
        let client = redis::Client::open(self.url.as_str())
            .map_err(|e| StoreError::connection(BACKEND, e))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::connection(BACKEND, e))?;
        tracing::debug!("connected to {}", self.url);
        self.conn = Some(conn);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), StoreError> {
        // The socket closes once the last handle is dropped.
        if self.conn.take().is_some() {
            tracing::debug!("released connection to {}", self.url);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection()?;
        conn.get::<_, Option<String>>(key).await.map_err(map_err)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        conn.set::<_, _, ()>(key, value).await.map_err(map_err)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection()?;
        let removed: u64 = conn.del(key).await.map_err(map_err)?;
        Ok(removed > 0)
    }

    /// Walks the keyspace with `SCAN` until the cursor wraps to zero, deleting
    /// each page of matches as it goes.
    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, StoreError> {
        let mut conn = self.connection()?;
        let removed = scan_delete(&mut conn, pattern, self.scan_batch).await?;
        tracing::debug!("deleted {} key(s) matching {}", removed, pattern);
        Ok(removed)
    }
}

async fn scan_delete<C>(conn: &mut C, pattern: &str, batch: usize) -> Result<u64, StoreError>
where
    C: ConnectionLike + Send,
{
    let mut cursor: u64 = 0;
    let mut removed = 0u64;

    loop {
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(batch)
            .query_async(conn)
            .await
            .map_err(map_err)?;

        // Pages may come back empty before the scan is over.
        if !keys.is_empty() {
            let deleted: u64 = conn.del(&keys).await.map_err(map_err)?;
            removed += deleted;
        }

        cursor = next;
        if cursor == 0 {
            return Ok(removed);
        }
    }
}
