//! Background jobs driven by the apalis monitor.

mod view_sync;

pub use view_sync::{ViewSyncJob, ViewSyncJobContext, process_view_sync_job, view_sync_schedule};
