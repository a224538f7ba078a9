//! Persistent on-disk store backed by SQLite
//!
//! Statements run inline on the calling task. They touch one indexed row (or
//! one `GLOB` scan) on a local file, which is short enough not to warrant a
//! blocking pool.

use super::{KeyValueStore, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

const BACKEND: &str = "sqlite";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS kv_entries (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
";

pub struct SqliteStore {
    path: PathBuf,
    conn: Option<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), conn: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_conn<R>(
        &self,
        op: impl FnOnce(&Connection) -> rusqlite::Result<R>,
    ) -> Result<R, StoreError> {
        let conn = self.conn.as_ref().ok_or(StoreError::NotStarted { backend: BACKEND })?;
        let guard = conn.lock();
        op(&guard).map_err(map_err)
    }
}

fn map_err(err: rusqlite::Error) -> StoreError {
    use rusqlite::ErrorCode;
    let unavailable = matches!(
        err.sqlite_error_code(),
        Some(
            ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
        )
    );
    if unavailable {
        StoreError::connection(BACKEND, err)
    } else {
        StoreError::Backend { backend: BACKEND, message: err.to_string() }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn start(&mut self) -> Result<(), StoreError> {
        if self.conn.is_some() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::connection(BACKEND, e))?;
        }
        let conn = Connection::open(&self.path).map_err(|e| StoreError::connection(BACKEND, e))?;
        conn.execute_batch(SCHEMA).map_err(map_err)?;
        tracing::debug!("opened {}", self.path.display());
        self.conn = Some(Mutex::new(conn));
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), StoreError> {
        if let Some(conn) = self.conn.take() {
            conn.into_inner().close().map_err(|(_, e)| map_err(e))?;
            tracing::debug!("closed {}", self.path.display());
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM kv_entries WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
        })
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv_entries(key, value) VALUES(?1, ?2)",
                params![key, value],
            )
        })
        .map(|_| ())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key]))
            .map(|changed| changed > 0)
    }

    /// SQLite `GLOB` shares the `*`, `?` and `[...]` syntax of Redis patterns.
    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv_entries WHERE key GLOB ?1", params![pattern])
        })
        .map(|changed| changed as u64)
    }
}
