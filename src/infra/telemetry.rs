use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "folio_search_cache_hit_total",
            Unit::Count,
            "Total number of search-cache hits."
        );
        describe_counter!(
            "folio_search_cache_miss_total",
            Unit::Count,
            "Total number of search-cache misses."
        );
        describe_counter!(
            "folio_search_cache_self_heal_total",
            Unit::Count,
            "Total number of corrupt cache entries deleted on read."
        );
        describe_counter!(
            "folio_search_cache_invalidated_total",
            Unit::Count,
            "Total number of cache entries removed by bulk invalidation."
        );
        describe_counter!(
            "folio_view_sync_cycles_total",
            Unit::Count,
            "Total number of view-sync cycles, labeled by outcome."
        );
        describe_counter!(
            "folio_view_sync_views_total",
            Unit::Count,
            "Total number of views folded into durable records."
        );
        describe_gauge!(
            "folio_views_pending",
            Unit::Count,
            "Pending views awaiting the next sync cycle, as of the last status query."
        );
    });
}
