//! Key/value store capability consumed by counters, caching, and view sync.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("key/value store unavailable: {message}")]
    Unavailable { message: String },
    #[error("value at `{key}` is not an integer")]
    NotAnInteger { key: String },
}

impl KvError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Fast, volatile key/value storage.
///
/// Implementations must tolerate arbitrary concurrent callers. None of the
/// operations promise durability across a store restart; the view-sync cycle
/// exists precisely because of that.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Atomically increment the integer at `key`, treating an absent key as
    /// zero. Returns the post-increment value.
    async fn incr(&self, key: &str) -> Result<i64, KvError>;

    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Store a value that expires after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError>;

    /// List all live keys starting with `prefix`.
    async fn scan(&self, prefix: &str) -> Result<Vec<String>, KvError>;

    async fn delete_many(&self, keys: &[String]) -> Result<(), KvError>;
}
