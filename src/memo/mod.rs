//! Memoization of async computations over a key-value store
//!
//! [`Memoizer`] wraps a computation and a [`TypedStore`]. A cache hit returns
//! the stored value without running the computation, so its side effects do
//! not repeat.
//!
//! There is no single-flight protection: two calls with the same key that
//! overlap in time can both miss and both run the computation. Callers that
//! need exactly-once execution must serialize those calls themselves.

pub mod key;

pub use key::{canonical_key, hashed_key, KeyStrategy};

use crate::store::{KeyValueStore, StoreError, TypedStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use thiserror::Error;

/// Misuse detected while building a memoizer.
#[derive(Debug, Error)]
#[error("Invalid memoizer setup: {0}")]
pub struct UsageError(String);

#[derive(Debug, Error)]
pub enum MemoError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The arguments could not be serialized into a key.
    #[error("Failed to derive cache key: {0}")]
    Key(#[source] serde_json::Error),

    #[error("Memoized computation failed: {0}")]
    Compute(#[source] anyhow::Error),
}

/// A computation `A -> T` whose results are cached in a store.
pub struct Memoizer<'s, A, T, S, F> {
    identity: String,
    store: &'s TypedStore<T, S>,
    keys: KeyStrategy<A>,
    compute: F,
}

impl<'s, A, T, S, F, Fut> Memoizer<'s, A, T, S, F>
where
    A: Serialize,
    T: Serialize + DeserializeOwned,
    S: KeyValueStore,
    F: Fn(A) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    /// Wrap `compute` under `identity`, which namespaces the derived keys.
    ///
    /// A blank identity is rejected: every computation sharing the store would
    /// map the same arguments to the same key.
    pub fn new(
        identity: impl Into<String>,
        store: &'s TypedStore<T, S>,
        compute: F,
    ) -> Result<Self, UsageError> {
        let identity = identity.into();
        if identity.trim().is_empty() {
            return Err(UsageError("computation identity must not be blank".to_string()));
        }
        Ok(Self { identity, store, keys: KeyStrategy::default(), compute })
    }

    /// Key on a SHA-256 of the arguments instead of their JSON text.
    pub fn hashed(mut self) -> Self {
        self.keys = KeyStrategy::Hashed;
        self
    }

    /// Derive keys with `generator` instead of the identity + arguments rule.
    pub fn with_key_generator<G>(mut self, generator: G) -> Self
    where
        G: Fn(&A) -> String + Send + Sync + 'static,
    {
        self.keys = KeyStrategy::custom(generator);
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn key_for(&self, args: &A) -> Result<String, MemoError> {
        self.keys.derive(&self.identity, args).map_err(MemoError::Key)
    }

    /// Return the cached result for `args`, computing and storing it on a miss.
    pub async fn call(&self, args: A) -> Result<T, MemoError> {
        let key = self.key_for(&args)?;

        if let Some(hit) = self.store.get(&key).await? {
            tracing::debug!("{}: cache hit for {}", self.identity, key);
            return Ok(hit);
        }

        tracing::debug!("{}: cache miss for {}", self.identity, key);
        let value = (self.compute)(args).await.map_err(MemoError::Compute)?;
        Ok(self.store.set(&key, value).await?)
    }

    /// Drop the cached result for `args`. Returns whether one existed.
    pub async fn invalidate(&self, args: &A) -> Result<bool, MemoError> {
        let key = self.key_for(args)?;
        Ok(self.store.delete(&key).await?)
    }
}
