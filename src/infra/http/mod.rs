mod admin;
mod auth;
mod error;
mod health;
mod papers;
mod state;

pub use error::ApiError;
pub use state::HttpState;

use axum::Router;
use axum::routing::{get, post};

/// Assemble the public + admin route table.
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/papers", post(papers::upload_paper).get(papers::search_papers))
        .route("/papers/{paper_id}", get(papers::paper_detail))
        .route("/admin/sync-now", post(admin::sync_now))
        .route("/admin/sync-status", get(admin::sync_status))
        .with_state(state)
}
