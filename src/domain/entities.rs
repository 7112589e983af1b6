//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperRecord {
    pub id: Uuid,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub publication_date: Date,
    pub journal_conference: String,
    pub keywords: Vec<String>,
    pub uploaded_by: Uuid,
    /// Durable view total. Monotonically non-decreasing; mutated only by the
    /// view-sync merge.
    pub views: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub department: String,
    pub created_at: OffsetDateTime,
}
