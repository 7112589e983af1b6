use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Row};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::application::repos::{
    CreatePaperParams, PaperSummary, PapersRepo, RepoError,
};
use crate::domain::entities::PaperRecord;
use crate::domain::types::{SortField, SortOrder};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct PaperRow {
    id: Uuid,
    title: String,
    authors: Vec<String>,
    #[sqlx(rename = "abstract")]
    abstract_text: String,
    publication_date: Date,
    journal_conference: String,
    keywords: Vec<String>,
    uploaded_by: Uuid,
    views: i64,
    created_at: OffsetDateTime,
}

impl From<PaperRow> for PaperRecord {
    fn from(row: PaperRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            authors: row.authors,
            abstract_text: row.abstract_text,
            publication_date: row.publication_date,
            journal_conference: row.journal_conference,
            keywords: row.keywords,
            uploaded_by: row.uploaded_by,
            views: row.views,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    title: String,
    authors: Vec<String>,
    publication_date: Date,
    journal_conference: String,
    keywords: Vec<String>,
}

impl From<SummaryRow> for PaperSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            authors: row.authors,
            publication_date: row.publication_date,
            journal_conference: row.journal_conference,
            keywords: row.keywords,
        }
    }
}

// Must stay aligned with the expression index created in the migrations.
const SEARCH_DOCUMENT_EXPR: &str = "papers_search_document(p.title, p.abstract, p.keywords)";

#[async_trait]
impl PapersRepo for PostgresRepositories {
    async fn create_paper(&self, params: CreatePaperParams) -> Result<PaperRecord, RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        let row: PaperRow = sqlx::query_as(
            r#"
            INSERT INTO papers (
                title, authors, abstract, publication_date,
                journal_conference, keywords, uploaded_by, views
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 0)
            RETURNING id, title, authors, abstract, publication_date,
                      journal_conference, keywords, uploaded_by, views, created_at
            "#,
        )
        .bind(&params.title)
        .bind(&params.authors)
        .bind(&params.abstract_text)
        .bind(params.publication_date)
        .bind(&params.journal_conference)
        .bind(&params.keywords)
        .bind(params.uploaded_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for cited in &params.citations {
            sqlx::query(
                "INSERT INTO citations (paper_id, cited_paper_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(row.id)
            .bind(cited)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PaperRecord>, RepoError> {
        let row: Option<PaperRow> = sqlx::query_as(
            r#"
            SELECT id, title, authors, abstract, publication_date,
                   journal_conference, keywords, uploaded_by, views, created_at
            FROM papers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn search_papers(
        &self,
        term: &str,
        sort_by: SortField,
        order: SortOrder,
    ) -> Result<Vec<PaperSummary>, RepoError> {
        let term = term.trim();
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT p.id, p.title, p.authors, p.publication_date, \
             p.journal_conference, p.keywords FROM papers p ",
        );

        if !term.is_empty() {
            qb.push(" WHERE ");
            qb.push(SEARCH_DOCUMENT_EXPR);
            qb.push(" @@ plainto_tsquery('english', ");
            qb.push_bind(term);
            qb.push(") ");
        }

        // Text rank only orders full-text matches; an empty term falls back
        // to recency regardless of the requested criterion.
        match (sort_by, term.is_empty()) {
            (SortField::Relevance, false) => {
                qb.push(" ORDER BY ts_rank(");
                qb.push(SEARCH_DOCUMENT_EXPR);
                qb.push(", plainto_tsquery('english', ");
                qb.push_bind(term);
                qb.push(")) DESC ");
            }
            (SortField::Relevance, true) | (SortField::PublicationDate, _) => {
                qb.push(" ORDER BY p.publication_date ");
                qb.push(match order {
                    SortOrder::Asc => " ASC ",
                    SortOrder::Desc => " DESC ",
                });
            }
        }

        let rows: Vec<SummaryRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn merge_views(&self, id: Uuid, delta: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE papers SET views = views + $1 WHERE id = $2")
            .bind(delta)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn citation_count(&self, id: Uuid) -> Result<i64, RepoError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM citations WHERE cited_paper_id = $1")
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.try_get::<i64, _>("count").map_err(map_sqlx_error)
    }

    async fn filter_missing_citations(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query("SELECT id FROM papers WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let found: Vec<Uuid> = rows
            .iter()
            .map(|row| row.try_get("id"))
            .collect::<Result<_, _>>()
            .map_err(map_sqlx_error)?;

        Ok(ids
            .iter()
            .copied()
            .filter(|id| !found.contains(id))
            .collect())
    }
}
