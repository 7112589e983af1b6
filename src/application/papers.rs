//! Paper catalog service: upload, search, and the view-counting read path.

use std::sync::Arc;

use serde::Serialize;
use time::Date;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{SearchCache, ViewCounters};
use crate::domain::entities::PaperRecord;
use crate::domain::papers::NewPaper;
use crate::domain::types::{SortField, SortOrder};

use super::error::AppError;
use super::repos::{CreatePaperParams, PaperSummary, PapersRepo};

const SOURCE: &str = "application::papers";

/// Detail-endpoint response shape.
#[derive(Debug, Clone, Serialize)]
pub struct PaperDetail {
    pub id: Uuid,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub publication_date: Date,
    pub journal_conference: String,
    pub keywords: Vec<String>,
    pub uploaded_by: Uuid,
    /// Durable total plus views still pending in the counter store,
    /// including the view recorded for this very request.
    pub total_views: i64,
    pub citation_count: i64,
}

pub struct PaperService {
    papers: Arc<dyn PapersRepo>,
    counters: ViewCounters,
    search_cache: SearchCache,
}

impl PaperService {
    pub fn new(papers: Arc<dyn PapersRepo>, counters: ViewCounters, search_cache: SearchCache) -> Self {
        Self {
            papers,
            counters,
            search_cache,
        }
    }

    /// Validate and store a new paper, then drop the whole search cache.
    ///
    /// Invalidation runs strictly after the durable insert succeeded, so a
    /// failed upload never costs cached results.
    pub async fn upload(&self, uploaded_by: Uuid, paper: NewPaper) -> Result<PaperRecord, AppError> {
        let validated = paper.validate().map_err(AppError::validation)?;

        let missing = self
            .papers
            .filter_missing_citations(&validated.citations)
            .await?;
        if !missing.is_empty() {
            return Err(AppError::validation(
                missing
                    .iter()
                    .map(|id| format!("Citation not found: {id}"))
                    .collect(),
            ));
        }

        let record = self
            .papers
            .create_paper(CreatePaperParams {
                title: validated.title,
                authors: validated.authors,
                abstract_text: validated.abstract_text,
                publication_date: validated.publication_date,
                journal_conference: validated.journal_conference,
                keywords: validated.keywords,
                uploaded_by,
                citations: validated.citations,
            })
            .await?;

        self.search_cache.invalidate_all().await;
        info!(target = SOURCE, paper_id = %record.id, "paper uploaded");
        Ok(record)
    }

    /// Search the catalog, serving from cache when possible.
    pub async fn search(
        &self,
        term: &str,
        sort_by: SortField,
        order: SortOrder,
    ) -> Result<Vec<PaperSummary>, AppError> {
        if let Some(cached) = self.search_cache.get(term, sort_by, order).await {
            return Ok(cached);
        }

        let results = self.papers.search_papers(term, sort_by, order).await?;
        self.search_cache.set(term, sort_by, order, &results).await;
        Ok(results)
    }

    /// Serve a paper's detail view, counting this read.
    ///
    /// The view is recorded first so the returned total already includes it;
    /// the durable fetch is the only call here allowed to fail the request.
    pub async fn detail(&self, paper_id: Uuid) -> Result<PaperDetail, AppError> {
        self.counters.record_view(paper_id).await;

        let record = self
            .papers
            .find_by_id(paper_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let pending = self.counters.pending(paper_id).await;
        let citation_count = match self.papers.citation_count(paper_id).await {
            Ok(count) => count,
            Err(err) => {
                debug!(target = SOURCE, paper_id = %paper_id, error = %err, "citation count failed, defaulting to 0");
                0
            }
        };

        Ok(PaperDetail {
            total_views: record.views + pending,
            id: record.id,
            title: record.title,
            authors: record.authors,
            abstract_text: record.abstract_text,
            publication_date: record.publication_date,
            journal_conference: record.journal_conference,
            keywords: record.keywords,
            uploaded_by: record.uploaded_by,
            citation_count,
        })
    }

    /// Validate raw query parameters into typed sort criteria.
    pub fn parse_search_params(
        sort_by: Option<&str>,
        order: Option<&str>,
    ) -> Result<(SortField, SortOrder), AppError> {
        let mut errors = Vec::new();

        let sort_by = match sort_by {
            None => Some(SortField::Relevance),
            Some(raw) => {
                let parsed = SortField::parse(raw);
                if parsed.is_none() {
                    errors.push(
                        "sort_by must be 'publication_date' or 'relevance'".to_string(),
                    );
                }
                parsed
            }
        };
        let order = match order {
            None => Some(SortOrder::Desc),
            Some(raw) => {
                let parsed = SortOrder::parse(raw);
                if parsed.is_none() {
                    errors.push("order must be 'asc' or 'desc'".to_string());
                }
                parsed
            }
        };

        match (sort_by, order) {
            (Some(sort_by), Some(order)) => Ok((sort_by, order)),
            _ => Err(AppError::validation(errors)),
        }
    }
}

impl From<&PaperRecord> for PaperSummary {
    fn from(record: &PaperRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            authors: record.authors.clone(),
            publication_date: record.publication_date,
            journal_conference: record.journal_conference.clone(),
            keywords: record.keywords.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_params_default_to_relevance_desc() {
        let (sort_by, order) = PaperService::parse_search_params(None, None).unwrap();
        assert_eq!(sort_by, SortField::Relevance);
        assert_eq!(order, SortOrder::Desc);
    }

    #[test]
    fn search_params_reject_unknown_values_with_both_messages() {
        let err = PaperService::parse_search_params(Some("citations"), Some("sideways"))
            .unwrap_err();
        match err {
            AppError::Validation { errors } => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("sort_by"));
                assert!(errors[1].contains("order"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
