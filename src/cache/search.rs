//! Search-result cache over the key/value store.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

use crate::application::repos::PaperSummary;
use crate::domain::types::{SortField, SortOrder};

use super::keys::{SEARCH_PREFIX, search_key};
use super::kv::KvStore;

const SOURCE: &str = "cache::search";

/// Caches serialized search payloads with a fixed TTL.
///
/// Caching here is an optimization, never a correctness requirement: every
/// failure path degrades to a miss, and a payload that no longer
/// deserializes is deleted rather than served.
pub struct SearchCache {
    kv: Arc<dyn KvStore>,
    ttl: Duration,
}

impl SearchCache {
    pub fn new(kv: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    pub async fn get(
        &self,
        term: &str,
        sort_by: SortField,
        order: SortOrder,
    ) -> Option<Vec<PaperSummary>> {
        let key = search_key(term, sort_by, order);
        let raw = match self.kv.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                counter!("folio_search_cache_miss_total").increment(1);
                return None;
            }
            Err(err) => {
                debug!(target = SOURCE, key = %key, error = %err, "cache read failed, treating as miss");
                counter!("folio_search_cache_miss_total").increment(1);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(results) => {
                counter!("folio_search_cache_hit_total").increment(1);
                Some(results)
            }
            Err(err) => {
                warn!(target = SOURCE, key = %key, error = %err, "corrupt cache payload, deleting entry");
                counter!("folio_search_cache_self_heal_total").increment(1);
                if let Err(err) = self.kv.delete_many(&[key.clone()]).await {
                    debug!(target = SOURCE, key = %key, error = %err, "failed to delete corrupt entry");
                }
                None
            }
        }
    }

    pub async fn set(
        &self,
        term: &str,
        sort_by: SortField,
        order: SortOrder,
        results: &[PaperSummary],
    ) {
        let key = search_key(term, sort_by, order);
        let payload = match serde_json::to_string(results) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(target = SOURCE, key = %key, error = %err, "failed to serialize search payload");
                return;
            }
        };
        if let Err(err) = self.kv.set_with_ttl(&key, &payload, self.ttl).await {
            debug!(target = SOURCE, key = %key, error = %err, "cache write failed, skipping");
        }
    }

    /// Drop every cached search payload. Coarse on purpose: any new paper can
    /// change any result list, and correctness wins over hit-rate.
    pub async fn invalidate_all(&self) {
        let keys = match self.kv.scan(SEARCH_PREFIX).await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(target = SOURCE, error = %err, "cache scan failed, skipping invalidation");
                return;
            }
        };
        if keys.is_empty() {
            return;
        }
        let count = keys.len();
        if let Err(err) = self.kv.delete_many(&keys).await {
            warn!(target = SOURCE, error = %err, "cache invalidation failed");
            return;
        }
        counter!("folio_search_cache_invalidated_total").increment(count as u64);
        debug!(target = SOURCE, entries = count, "search cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryKv;
    use uuid::Uuid;

    fn summary(title: &str) -> PaperSummary {
        PaperSummary {
            id: Uuid::new_v4(),
            title: title.to_string(),
            authors: vec!["A. Author".to_string()],
            publication_date: time::macros::date!(2024 - 01 - 15),
            journal_conference: String::new(),
            keywords: vec!["kw".to_string()],
        }
    }

    fn cache() -> (Arc<MemoryKv>, SearchCache) {
        let kv = Arc::new(MemoryKv::new());
        let cache = SearchCache::new(kv.clone(), Duration::from_secs(300));
        (kv, cache)
    }

    #[tokio::test]
    async fn set_then_get_returns_equal_payload() {
        let (_kv, cache) = cache();
        let results = vec![summary("one"), summary("two")];

        cache
            .set("term", SortField::Relevance, SortOrder::Desc, &results)
            .await;
        let cached = cache
            .get("term", SortField::Relevance, SortOrder::Desc)
            .await
            .expect("cache hit");

        assert_eq!(cached, results);
    }

    #[tokio::test]
    async fn different_sort_parameters_are_distinct_entries() {
        let (_kv, cache) = cache();
        cache
            .set("term", SortField::Relevance, SortOrder::Desc, &[])
            .await;
        assert!(
            cache
                .get("term", SortField::PublicationDate, SortOrder::Desc)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn corrupt_payload_is_a_miss_and_gets_deleted() {
        let (kv, cache) = cache();
        let key = search_key("term", SortField::Relevance, SortOrder::Desc);
        kv.set(&key, "{not json").await.unwrap();

        assert!(
            cache
                .get("term", SortField::Relevance, SortOrder::Desc)
                .await
                .is_none()
        );
        assert_eq!(kv.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalidate_all_purges_every_entry() {
        let (kv, cache) = cache();
        cache
            .set("alpha", SortField::Relevance, SortOrder::Desc, &[])
            .await;
        cache
            .set("beta", SortField::PublicationDate, SortOrder::Asc, &[])
            .await;
        kv.set("paper_views:keepme", "7").await.unwrap();

        cache.invalidate_all().await;

        assert!(
            cache
                .get("alpha", SortField::Relevance, SortOrder::Desc)
                .await
                .is_none()
        );
        assert!(
            cache
                .get("beta", SortField::PublicationDate, SortOrder::Asc)
                .await
                .is_none()
        );
        // Counter namespace is untouched.
        assert_eq!(
            kv.get("paper_views:keepme").await.unwrap().as_deref(),
            Some("7")
        );
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let kv = Arc::new(MemoryKv::new());
        let cache = SearchCache::new(kv, Duration::ZERO);
        cache
            .set("term", SortField::Relevance, SortOrder::Desc, &[summary("x")])
            .await;
        assert!(
            cache
                .get("term", SortField::Relevance, SortOrder::Desc)
                .await
                .is_none()
        );
    }
}
