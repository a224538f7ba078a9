//! Pluggable key-value stores
//!
//! Backends move raw text; [`TypedStore`] adds the JSON serialization
//! boundary on top. Connection-bearing backends are bracketed by
//! `start`/`stop`, see [`scoped`].

pub mod error;
pub mod memory;
pub mod redis;
pub mod sqlite;
pub mod typed;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use redis::RedisStore;
pub use sqlite::SqliteStore;
pub use typed::TypedStore;

use crate::config::{CacheBackend, CacheSettings};
use async_trait::async_trait;
use futures::future::BoxFuture;

/// Text key-value store with optional lifecycle and bulk delete.
///
/// `get` never fails for a missing key: absence is `Ok(None)`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Short backend name used in logs and errors.
    fn backend(&self) -> &'static str;

    /// Acquire resources. No-op unless the backend holds a connection.
    async fn start(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Release resources acquired by `start`.
    async fn stop(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Returns whether a value was actually removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Best-effort bulk delete of keys matching a glob (`*`, `?`, `[...]`).
    /// Returns the number of keys removed.
    async fn delete_by_pattern(&self, _pattern: &str) -> Result<u64, StoreError> {
        Err(StoreError::Unsupported { backend: self.backend(), operation: "delete_by_pattern" })
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    async fn start(&mut self) -> Result<(), StoreError> {
        (**self).start().await
    }

    async fn stop(&mut self) -> Result<(), StoreError> {
        (**self).stop().await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete(key).await
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, StoreError> {
        (**self).delete_by_pattern(pattern).await
    }
}

/// Build the backend selected in the configuration. The store is not started.
pub fn open(settings: &CacheSettings) -> Box<dyn KeyValueStore> {
    match settings.backend {
        CacheBackend::Memory => Box::new(MemoryStore::new()),
        CacheBackend::Redis => {
            Box::new(RedisStore::new(settings.url.clone()).scan_batch(settings.batch))
        }
        CacheBackend::Sqlite => Box::new(SqliteStore::new(settings.path.clone())),
    }
}

/// Run `body` between `start` and `stop`.
///
/// `stop` runs whether the body succeeds or fails. When both fail, the body's
/// error is returned and the stop failure is logged.
pub async fn scoped<S, R, E, F>(store: &mut S, body: F) -> Result<R, E>
where
    S: KeyValueStore + ?Sized,
    E: From<StoreError>,
    F: for<'a> FnOnce(&'a S) -> BoxFuture<'a, Result<R, E>>,
{
    store.start().await?;
    tracing::debug!("{} store started", store.backend());

    let outcome = body(&*store).await;
    let stopped = store.stop().await;
    tracing::debug!("{} store stopped", store.backend());

    match (outcome, stopped) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(stop_err)) => Err(stop_err.into()),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(stop_err)) => {
            tracing::warn!("{} store failed to stop: {}", store.backend(), stop_err);
            Err(err)
        }
    }
}

/// Shared behaviour every backend must satisfy.
#[cfg(test)]
pub(crate) mod contract {
    use super::{KeyValueStore, StoreError, TypedStore};

    pub async fn missing_key_is_absent<S: KeyValueStore>(store: &S) {
        assert_eq!(store.get("contract:unknown").await.expect("get"), None);
    }

    pub async fn set_then_get_round_trips<S: KeyValueStore>(store: &S) {
        store.set("contract:k1", "\"value1\"".to_string()).await.expect("set");
        assert_eq!(store.get("contract:k1").await.expect("get").as_deref(), Some("\"value1\""));
    }

    pub async fn set_overwrites<S: KeyValueStore>(store: &S) {
        store.set("contract:over", "1".to_string()).await.expect("set");
        store.set("contract:over", "2".to_string()).await.expect("set");
        assert_eq!(store.get("contract:over").await.expect("get").as_deref(), Some("2"));
    }

    pub async fn delete_reports_removal<S: KeyValueStore>(store: &S) {
        store.set("contract:del", "1".to_string()).await.expect("set");
        assert!(store.delete("contract:del").await.expect("delete"));
        assert_eq!(store.get("contract:del").await.expect("get"), None);
        assert!(!store.delete("contract:del").await.expect("delete"));
    }

    pub async fn falsy_values_are_hits<S: KeyValueStore>(store: S) {
        let numbers: TypedStore<i64, _> = TypedStore::new(store);
        assert_eq!(numbers.set("contract:zero", 0).await.expect("set"), 0);
        assert_eq!(numbers.get("contract:zero").await.expect("get"), Some(0));

        let flags: TypedStore<bool, _> = TypedStore::new(numbers.into_inner());
        flags.set("contract:false", false).await.expect("set");
        assert_eq!(flags.get("contract:false").await.expect("get"), Some(false));

        let text: TypedStore<String, _> = TypedStore::new(flags.into_inner());
        text.set("contract:empty", String::new()).await.expect("set");
        assert_eq!(text.get("contract:empty").await.expect("get"), Some(String::new()));
    }

    pub async fn pattern_delete_scopes_to_namespace<S: KeyValueStore>(store: &S) {
        for key in ["compute:[1,2]", "compute:[3,4]", "other:[1,2]"] {
            store.set(key, "1".to_string()).await.expect("set");
        }
        let removed = store.delete_by_pattern("compute:*").await.expect("delete_by_pattern");
        assert_eq!(removed, 2);
        assert_eq!(store.get("compute:[1,2]").await.expect("get"), None);
        assert_eq!(store.get("other:[1,2]").await.expect("get").as_deref(), Some("1"));
    }

    pub async fn undecodable_value_is_decode_error<S: KeyValueStore>(store: S) {
        store.set("contract:bad", "not json".to_string()).await.expect("set");
        let typed: TypedStore<u32, _> = TypedStore::new(store);
        let err = typed.get("contract:bad").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "contract:bad"));
    }
}
