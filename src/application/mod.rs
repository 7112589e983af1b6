//! Application services layer.

pub mod auth;
pub mod error;
pub mod jobs;
pub mod papers;
pub mod repos;
pub mod view_sync;
