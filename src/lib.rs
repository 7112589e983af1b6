//! Folio: a paper-catalog backend.
//!
//! Durable paper records live in Postgres; per-paper view counters and cached
//! search results live in a fast in-memory key/value store. The
//! [`application::view_sync`] module owns the reconciliation between the two.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
