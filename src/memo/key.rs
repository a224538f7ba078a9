//! Cache key derivation
//!
//! Keys depend only on the computation's identity and the serde
//! serialization of its arguments, so they are stable across restarts.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// How a [`Memoizer`](super::Memoizer) turns arguments into a key.
pub enum KeyStrategy<A> {
    /// `<identity>:<canonical JSON of the arguments>`.
    Canonical,
    /// `<identity>:<sha256 hex of the canonical JSON>`, for bulky arguments.
    Hashed,
    /// Caller-supplied generator; the identity is not prepended.
    Custom(Box<dyn Fn(&A) -> String + Send + Sync>),
}

impl<A> Default for KeyStrategy<A> {
    fn default() -> Self {
        Self::Canonical
    }
}

impl<A> KeyStrategy<A> {
    pub fn custom<F>(generator: F) -> Self
    where
        F: Fn(&A) -> String + Send + Sync + 'static,
    {
        Self::Custom(Box::new(generator))
    }
}

impl<A: Serialize> KeyStrategy<A> {
    pub fn derive(&self, identity: &str, args: &A) -> Result<String, serde_json::Error> {
        match self {
            Self::Canonical => canonical_key(identity, args),
            Self::Hashed => hashed_key(identity, args),
            Self::Custom(generator) => Ok(generator(args)),
        }
    }
}

/// Arguments go through `serde_json::Value`, whose objects keep keys sorted,
/// so structurally equal arguments give identical text even when they hold
/// hash maps.
pub fn canonical_key<A: Serialize>(identity: &str, args: &A) -> Result<String, serde_json::Error> {
    Ok(format!("{identity}:{}", canonical_json(args)?))
}

pub fn hashed_key<A: Serialize>(identity: &str, args: &A) -> Result<String, serde_json::Error> {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(args)?.as_bytes());
    Ok(format!("{identity}:{:x}", hasher.finalize()))
}

fn canonical_json<A: Serialize>(args: &A) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_value(args)?.to_string())
}
