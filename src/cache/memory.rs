//! Process-local [`KvStore`] backed by a concurrent hash map.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::kv::{KvError, KvStore};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn persistent(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    fn expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// In-memory key/value store with per-entry expiry.
///
/// Expired entries are dropped lazily on the read/scan path rather than by a
/// sweeper task; `len` and memory use therefore track the live working set
/// only approximately.
#[derive(Default)]
pub struct MemoryKv {
    entries: DashMap<String, Entry>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn incr(&self, key: &str) -> Result<i64, KvError> {
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::persistent("0"));
        if entry.expired(now) {
            *entry = Entry::persistent("0");
        }
        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| KvError::NotAnInteger {
                key: key.to_string(),
            })?;
        let next = current + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let now = Instant::now();
        let value = match self.entries.get(key) {
            Some(entry) if !entry.expired(now) => Some(entry.value.clone()),
            Some(_) => None,
            None => None,
        };
        if value.is_none() {
            // Guard must be released before mutating the shard.
            self.entries.remove_if(key, |_, entry| entry.expired(now));
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.entries
            .insert(key.to_string(), Entry::persistent(value));
        Ok(())
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        let now = Instant::now();
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix) && !entry.value().expired(now))
            .map(|entry| entry.key().clone())
            .collect())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), KvError> {
        for key in keys {
            self.entries.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn incr_starts_from_implicit_zero() {
        let kv = MemoryKv::new();
        assert_eq!(kv.incr("paper_views:a").await.unwrap(), 1);
        assert_eq!(kv.incr("paper_views:a").await.unwrap(), 2);
        assert_eq!(kv.get("paper_views:a").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn incr_rejects_non_numeric_values() {
        let kv = MemoryKv::new();
        kv.set("k", "not a number").await.unwrap();
        assert!(matches!(
            kv.incr("k").await,
            Err(KvError::NotAnInteger { .. })
        ));
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let kv = MemoryKv::new();
        kv.set_with_ttl("k", "v", Duration::ZERO).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), None);
        assert!(kv.scan("k").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn incr_resurrects_an_expired_counter_at_zero() {
        let kv = MemoryKv::new();
        kv.set_with_ttl("c", "41", Duration::ZERO).await.unwrap();
        assert_eq!(kv.incr("c").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn scan_filters_by_prefix() {
        let kv = MemoryKv::new();
        kv.set("search:a", "1").await.unwrap();
        kv.set("search:b", "2").await.unwrap();
        kv.set("paper_views:c", "3").await.unwrap();

        let mut keys = kv.scan("search:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["search:a".to_string(), "search:b".to_string()]);
    }

    #[tokio::test]
    async fn delete_many_removes_every_listed_key() {
        let kv = MemoryKv::new();
        kv.set("a", "1").await.unwrap();
        kv.set("b", "2").await.unwrap();
        kv.delete_many(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(kv.get("a").await.unwrap(), None);
        assert_eq!(kv.get("b").await.unwrap(), None);
    }
}
