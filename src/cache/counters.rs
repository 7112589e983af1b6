//! Per-paper view counters (the read-path half of view accounting).

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::keys::view_counter_key;
use super::kv::KvStore;

const SOURCE: &str = "cache::counters";

/// Records and reads pending view counts.
///
/// Both operations are fail-soft: view counting is best-effort and must never
/// fail a detail request. Only the sync cycle resets counters; this type
/// never writes anything but increments.
pub struct ViewCounters {
    kv: Arc<dyn KvStore>,
}

impl ViewCounters {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Count one view for `paper_id`. A store failure is logged and dropped.
    pub async fn record_view(&self, paper_id: Uuid) {
        let key = view_counter_key(paper_id);
        if let Err(err) = self.kv.incr(&key).await {
            debug!(target = SOURCE, key = %key, error = %err, "view increment failed, dropping view");
        }
    }

    /// Views recorded since the last successful sync, or 0 when the counter
    /// is absent, unreadable, or unparsable.
    pub async fn pending(&self, paper_id: Uuid) -> i64 {
        let key = view_counter_key(paper_id);
        match self.kv.get(&key).await {
            Ok(Some(raw)) => raw.parse().unwrap_or(0),
            Ok(None) => 0,
            Err(err) => {
                debug!(target = SOURCE, key = %key, error = %err, "counter read failed, defaulting to 0");
                0
            }
        }
    }
}
