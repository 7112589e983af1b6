//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::domain::entities::{PaperRecord, UserRecord};
use crate::domain::types::{SortField, SortOrder};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Search-result projection of a paper, also the cached payload shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperSummary {
    pub id: Uuid,
    pub title: String,
    pub authors: Vec<String>,
    pub publication_date: Date,
    pub journal_conference: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePaperParams {
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    pub publication_date: Date,
    pub journal_conference: String,
    pub keywords: Vec<String>,
    pub uploaded_by: Uuid,
    pub citations: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub department: String,
}

#[async_trait]
pub trait PapersRepo: Send + Sync {
    /// Insert the paper (with `views = 0`) and its citation rows.
    async fn create_paper(&self, params: CreatePaperParams) -> Result<PaperRecord, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PaperRecord>, RepoError>;

    async fn search_papers(
        &self,
        term: &str,
        sort_by: SortField,
        order: SortOrder,
    ) -> Result<Vec<PaperSummary>, RepoError>;

    /// Atomically add `delta` to the durable view total of `id`.
    ///
    /// Returns whether a record with that id existed; callers use the `false`
    /// case for orphan detection and must not retry blindly.
    async fn merge_views(&self, id: Uuid, delta: i64) -> Result<bool, RepoError>;

    /// Number of papers citing `id`.
    async fn citation_count(&self, id: Uuid) -> Result<i64, RepoError>;

    /// Subset of `ids` that do not resolve to stored papers.
    async fn filter_missing_citations(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, RepoError>;
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;
}
