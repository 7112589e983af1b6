//! Folio counter-and-cache subsystem.
//!
//! Everything ephemeral lives behind the [`KvStore`] capability: per-paper
//! view counters (`paper_views:*`) and serialized search results
//! (`search:*`). The durable `views` field on a paper only ever changes when
//! the sync cycle folds pending counters into it.
//!
//! Read-path operations here are fail-soft: a store hiccup degrades to a
//! cache miss or a zero counter, never to a failed request.

mod counters;
mod keys;
mod kv;
mod memory;
mod search;

pub use counters::ViewCounters;
pub use keys::{
    SEARCH_PREFIX, VIEW_COUNTER_PREFIX, paper_id_from_counter_key, search_key, view_counter_key,
};
pub use kv::{KvError, KvStore};
pub use memory::MemoryKv;
pub use search::SearchCache;
