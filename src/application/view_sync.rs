//! Reconciliation of pending view counters into durable paper records.
//!
//! Counters accumulate in the key/value store under `paper_views:<id>` while
//! detail requests are served; a cycle folds each pending value into the
//! paper's durable `views` column and resets the counter. Cycles run on a
//! timer and on demand from the admin surface, through the same method, and
//! never concurrently with each other.

use std::sync::Arc;

use metrics::{counter, gauge};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{KvStore, VIEW_COUNTER_PREFIX, paper_id_from_counter_key};

use super::repos::PapersRepo;

const SOURCE: &str = "application::view_sync";
const STATUS_SAMPLE_LIMIT: usize = 10;

/// Overall outcome of one sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Success,
    PartialSuccess,
    Error,
}

/// Result of one reconciliation cycle, returned verbatim to the admin
/// surface.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub status: SyncOutcome,
    pub synced_papers: u64,
    pub total_views_synced: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub message: String,
    /// Set only when the cycle failed before processing any key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncReport {
    fn no_pending() -> Self {
        Self {
            status: SyncOutcome::Success,
            synced_papers: 0,
            total_views_synced: 0,
            errors: Vec::new(),
            message: "no pending views".to_string(),
            error: None,
        }
    }

    fn failed(cause: impl std::fmt::Display) -> Self {
        Self {
            status: SyncOutcome::Error,
            synced_papers: 0,
            total_views_synced: 0,
            errors: Vec::new(),
            message: "failed to sync paper views".to_string(),
            error: Some(cause.to_string()),
        }
    }
}

/// Pending-counter snapshot for the admin status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub pending_papers: usize,
    pub pending_views: i64,
    /// Bounded sample of counter keys; never the full listing.
    pub sample_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

enum KeyFailure {
    Orphan(Uuid),
    Store(String),
}

/// Drains pending view counters into the durable store.
pub struct ViewSyncService {
    kv: Arc<dyn KvStore>,
    papers: Arc<dyn PapersRepo>,
    // Serializes cycles; an overlapping trigger waits and then runs against
    // already-reset counters instead of double-merging them.
    cycle_guard: Mutex<()>,
}

impl ViewSyncService {
    pub fn new(kv: Arc<dyn KvStore>, papers: Arc<dyn PapersRepo>) -> Self {
        Self {
            kv,
            papers,
            cycle_guard: Mutex::new(()),
        }
    }

    /// Run one reconciliation cycle.
    ///
    /// Keys are processed independently: an orphaned counter or a store
    /// failure on one key is recorded and the cycle moves on. Only a failure
    /// of the initial scan fails the cycle as a whole.
    pub async fn run_cycle(&self) -> SyncReport {
        let _cycle = self.cycle_guard.lock().await;

        let keys = match self.kv.scan(VIEW_COUNTER_PREFIX).await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(target = SOURCE, error = %err, "counter scan failed, aborting cycle");
                counter!("folio_view_sync_cycles_total", "status" => "error").increment(1);
                return SyncReport::failed(err);
            }
        };

        if keys.is_empty() {
            counter!("folio_view_sync_cycles_total", "status" => "success").increment(1);
            return SyncReport::no_pending();
        }

        let mut synced_papers = 0u64;
        let mut total_views_synced = 0i64;
        let mut errors = Vec::new();

        for key in keys {
            match self.sync_key(&key).await {
                Ok(Some(views)) => {
                    synced_papers += 1;
                    total_views_synced += views;
                }
                Ok(None) => {}
                Err(KeyFailure::Orphan(id)) => {
                    errors.push(format!("paper not found: {id}"));
                }
                Err(KeyFailure::Store(cause)) => {
                    errors.push(format!("error syncing {key}: {cause}"));
                }
            }
        }

        let status = if errors.is_empty() {
            SyncOutcome::Success
        } else {
            SyncOutcome::PartialSuccess
        };
        let status_label = match status {
            SyncOutcome::Success => "success",
            SyncOutcome::PartialSuccess => "partial_success",
            SyncOutcome::Error => "error",
        };
        counter!("folio_view_sync_cycles_total", "status" => status_label).increment(1);
        counter!("folio_view_sync_views_total").increment(total_views_synced.max(0) as u64);

        info!(
            target = SOURCE,
            synced_papers,
            total_views_synced,
            error_count = errors.len(),
            "view sync cycle finished"
        );

        SyncReport {
            status,
            message: format!("synced {synced_papers} papers with {total_views_synced} total views"),
            synced_papers,
            total_views_synced,
            errors,
            error: None,
        }
    }

    /// Merge one counter. `Ok(None)` means nothing was pending for this key.
    async fn sync_key(&self, key: &str) -> Result<Option<i64>, KeyFailure> {
        let paper_id = paper_id_from_counter_key(key)
            .ok_or_else(|| KeyFailure::Store("invalid paper id in counter key".to_string()))?;

        let raw = match self
            .kv
            .get(key)
            .await
            .map_err(|err| KeyFailure::Store(err.to_string()))?
        {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let views: i64 = raw
            .parse()
            .map_err(|_| KeyFailure::Store(format!("counter value `{raw}` is not an integer")))?;
        if views <= 0 {
            return Ok(None);
        }

        let matched = self
            .papers
            .merge_views(paper_id, views)
            .await
            .map_err(|err| KeyFailure::Store(err.to_string()))?;
        if !matched {
            // Orphan: leave the counter for a future cycle or manual cleanup.
            return Err(KeyFailure::Orphan(paper_id));
        }

        // An increment landing between the merge above and this reset is
        // lost. Known bounded-inconsistency window, matching the tolerance
        // documented for this subsystem.
        self.kv
            .set(key, "0")
            .await
            .map_err(|err| KeyFailure::Store(err.to_string()))?;

        Ok(Some(views))
    }

    /// Snapshot of what the next cycle would pick up.
    pub async fn pending_status(&self) -> SyncStatus {
        let keys = match self.kv.scan(VIEW_COUNTER_PREFIX).await {
            Ok(keys) => keys,
            Err(err) => {
                return SyncStatus {
                    pending_papers: 0,
                    pending_views: 0,
                    sample_keys: Vec::new(),
                    error: Some(err.to_string()),
                };
            }
        };

        let mut pending_views = 0i64;
        for key in &keys {
            match self.kv.get(key).await {
                Ok(Some(raw)) => pending_views += raw.parse::<i64>().unwrap_or(0),
                Ok(None) => {}
                Err(_) => continue,
            }
        }
        gauge!("folio_views_pending").set(pending_views as f64);

        let sample_keys = keys.iter().take(STATUS_SAMPLE_LIMIT).cloned().collect();
        SyncStatus {
            pending_papers: keys.len(),
            pending_views,
            sample_keys,
            error: None,
        }
    }
}
