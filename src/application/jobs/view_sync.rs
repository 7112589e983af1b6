//! Cron job folding pending view counters into durable paper records.

use std::str::FromStr;
use std::sync::Arc;

use apalis::prelude::*;
use cron::Schedule;

use crate::application::view_sync::{SyncOutcome, ViewSyncService};

/// Marker struct for the cron-triggered sync job.
/// Must implement `From<chrono::DateTime<chrono::Utc>>` for apalis-cron compatibility.
#[derive(Default, Debug, Clone)]
pub struct ViewSyncJob;

impl From<chrono::DateTime<chrono::Utc>> for ViewSyncJob {
    fn from(_: chrono::DateTime<chrono::Utc>) -> Self {
        Self
    }
}

/// Context for the sync job worker.
#[derive(Clone)]
pub struct ViewSyncJobContext {
    pub view_sync: Arc<ViewSyncService>,
}

/// Process one scheduled sync tick. Runs the exact same cycle as the admin
/// `sync-now` endpoint; only the trigger differs.
pub async fn process_view_sync_job(
    _job: ViewSyncJob,
    ctx: Data<ViewSyncJobContext>,
) -> Result<(), apalis::prelude::Error> {
    let report = ctx.view_sync.run_cycle().await;
    match report.status {
        SyncOutcome::Success if report.synced_papers > 0 => {
            tracing::info!(
                synced_papers = report.synced_papers,
                total_views_synced = report.total_views_synced,
                "Scheduled view sync completed"
            );
        }
        SyncOutcome::Success => {}
        SyncOutcome::PartialSuccess => {
            tracing::warn!(
                synced_papers = report.synced_papers,
                errors = ?report.errors,
                "Scheduled view sync completed with errors"
            );
        }
        SyncOutcome::Error => {
            tracing::warn!(
                error = report.error.as_deref().unwrap_or("unknown"),
                "Scheduled view sync failed"
            );
        }
    }
    Ok(())
}

/// Create the cron schedule for view syncing, firing every
/// `interval_minutes` minutes on the minute.
pub fn view_sync_schedule(interval_minutes: u32) -> Schedule {
    Schedule::from_str(&format!("0 0/{interval_minutes} * * * *"))
        .expect("Invalid cron expression for view_sync")
}
