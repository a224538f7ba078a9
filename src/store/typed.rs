//! JSON serialization boundary over a text store

use super::{KeyValueStore, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A store of `T` values, encoded as JSON text in the backend `S`.
pub struct TypedStore<T, S> {
    inner: S,
    _value: PhantomData<fn() -> T>,
}

impl<T, S> TypedStore<T, S>
where
    T: Serialize + DeserializeOwned,
    S: KeyValueStore,
{
    pub fn new(inner: S) -> Self {
        Self { inner, _value: PhantomData }
    }

    /// `Ok(None)` when the key is absent. Stored `0`, `false` and `""` are
    /// returned as `Some`.
    pub async fn get(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.inner.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Decode { key: key.to_string(), source })
    }

    /// Upsert and hand the value back for chaining.
    pub async fn set(&self, key: &str, value: T) -> Result<T, StoreError> {
        let raw = serde_json::to_string(&value)
            .map_err(|source| StoreError::Encode { key: key.to_string(), source })?;
        self.inner.set(key, raw).await?;
        Ok(value)
    }

    pub async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.delete(key).await
    }

    pub async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, StoreError> {
        self.inner.delete_by_pattern(pattern).await
    }

    pub async fn start(&mut self) -> Result<(), StoreError> {
        self.inner.start().await
    }

    pub async fn stop(&mut self) -> Result<(), StoreError> {
        self.inner.stop().await
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}
