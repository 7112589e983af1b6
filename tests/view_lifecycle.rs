//! End-to-end behavior of the view-counting and caching subsystem, driven
//! through the public services over an in-memory catalog.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use folio::application::papers::PaperService;
use folio::application::repos::{
    CreatePaperParams, CreateUserParams, PaperSummary, PapersRepo, RepoError, UsersRepo,
};
use folio::application::view_sync::{SyncOutcome, ViewSyncService};
use folio::cache::{KvStore, MemoryKv, SearchCache, ViewCounters, view_counter_key};
use folio::domain::entities::{PaperRecord, UserRecord};
use folio::domain::papers::NewPaper;
use folio::domain::types::{SortField, SortOrder};

/// In-memory stand-in for the Postgres repositories.
#[derive(Default)]
struct InMemoryCatalog {
    papers: Mutex<HashMap<Uuid, PaperRecord>>,
    citations: Mutex<Vec<(Uuid, Uuid)>>,
    users: Mutex<HashMap<Uuid, UserRecord>>,
    search_calls: AtomicUsize,
}

impl InMemoryCatalog {
    fn durable_views(&self, id: Uuid) -> Option<i64> {
        self.papers.lock().unwrap().get(&id).map(|p| p.views)
    }

    fn live_search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PapersRepo for InMemoryCatalog {
    async fn create_paper(&self, params: CreatePaperParams) -> Result<PaperRecord, RepoError> {
        let record = PaperRecord {
            id: Uuid::new_v4(),
            title: params.title,
            authors: params.authors,
            abstract_text: params.abstract_text,
            publication_date: params.publication_date,
            journal_conference: params.journal_conference,
            keywords: params.keywords,
            uploaded_by: params.uploaded_by,
            views: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        for cited in &params.citations {
            self.citations.lock().unwrap().push((record.id, *cited));
        }
        self.papers
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PaperRecord>, RepoError> {
        Ok(self.papers.lock().unwrap().get(&id).cloned())
    }

    async fn search_papers(
        &self,
        term: &str,
        _sort_by: SortField,
        order: SortOrder,
    ) -> Result<Vec<PaperSummary>, RepoError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let needle = term.trim().to_lowercase();
        let mut results: Vec<PaperSummary> = self
            .papers
            .lock()
            .unwrap()
            .values()
            .filter(|p| {
                needle.is_empty()
                    || p.title.to_lowercase().contains(&needle)
                    || p.abstract_text.to_lowercase().contains(&needle)
                    || p.keywords.iter().any(|k| k.to_lowercase() == needle)
            })
            .map(PaperSummary::from)
            .collect();
        results.sort_by(|a, b| match order {
            SortOrder::Asc => a.publication_date.cmp(&b.publication_date),
            SortOrder::Desc => b.publication_date.cmp(&a.publication_date),
        });
        Ok(results)
    }

    async fn merge_views(&self, id: Uuid, delta: i64) -> Result<bool, RepoError> {
        let mut papers = self.papers.lock().unwrap();
        match papers.get_mut(&id) {
            Some(paper) => {
                paper.views += delta;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn citation_count(&self, id: Uuid) -> Result<i64, RepoError> {
        Ok(self
            .citations
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, cited)| *cited == id)
            .count() as i64)
    }

    async fn filter_missing_citations(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, RepoError> {
        let papers = self.papers.lock().unwrap();
        Ok(ids
            .iter()
            .copied()
            .filter(|id| !papers.contains_key(id))
            .collect())
    }
}

#[async_trait]
impl UsersRepo for InMemoryCatalog {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.username == params.username) {
            return Err(RepoError::Duplicate {
                constraint: "ux_users_username".to_string(),
            });
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: params.username,
            name: params.name,
            email: params.email,
            password_digest: params.password_digest,
            department: params.department,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

struct Harness {
    catalog: Arc<InMemoryCatalog>,
    kv: Arc<MemoryKv>,
    papers: PaperService,
    view_sync: ViewSyncService,
}

fn harness() -> Harness {
    let catalog = Arc::new(InMemoryCatalog::default());
    let kv = Arc::new(MemoryKv::new());
    let papers_repo: Arc<dyn PapersRepo> = catalog.clone();

    let papers = PaperService::new(
        papers_repo.clone(),
        ViewCounters::new(kv.clone()),
        SearchCache::new(kv.clone(), Duration::from_secs(300)),
    );
    let view_sync = ViewSyncService::new(kv.clone(), papers_repo);

    Harness {
        catalog,
        kv,
        papers,
        view_sync,
    }
}

fn sample_paper(title: &str) -> NewPaper {
    NewPaper {
        title: title.to_string(),
        authors: vec!["R. Hartley".to_string()],
        abstract_text: "Pending counters folded into durable records.".to_string(),
        publication_date: "2024-06-01".to_string(),
        journal_conference: String::new(),
        keywords: vec!["counters".to_string()],
        citations: Vec::new(),
    }
}

#[tokio::test]
async fn views_flow_from_counter_to_durable_record() {
    let h = harness();
    let uploader = Uuid::new_v4();
    let record = h
        .papers
        .upload(uploader, sample_paper("Write-Behind Counters"))
        .await
        .expect("upload succeeds");

    // Three reads: each records a view before computing the total, so the
    // running total tracks the reads immediately.
    let mut last_total = 0;
    for _ in 0..3 {
        last_total = h.papers.detail(record.id).await.unwrap().total_views;
    }
    assert_eq!(last_total, 3);
    assert_eq!(
        h.kv.get(&view_counter_key(record.id))
            .await
            .unwrap()
            .as_deref(),
        Some("3")
    );
    assert_eq!(h.catalog.durable_views(record.id), Some(0));

    let report = h.view_sync.run_cycle().await;
    assert_eq!(report.status, SyncOutcome::Success);
    assert_eq!(report.synced_papers, 1);
    assert_eq!(report.total_views_synced, 3);

    // Conservation: the pending views moved into the durable field and the
    // counter was reset.
    assert_eq!(h.catalog.durable_views(record.id), Some(3));
    assert_eq!(
        h.kv.get(&view_counter_key(record.id))
            .await
            .unwrap()
            .as_deref(),
        Some("0")
    );

    // The next read counts itself on top of the merged total.
    assert_eq!(h.papers.detail(record.id).await.unwrap().total_views, 4);
}

#[tokio::test]
async fn second_cycle_is_a_no_op_after_reset_counters_stay_zero() {
    let h = harness();
    let record = h
        .papers
        .upload(Uuid::new_v4(), sample_paper("Idempotent Cycles"))
        .await
        .unwrap();
    h.papers.detail(record.id).await.unwrap();

    let first = h.view_sync.run_cycle().await;
    assert_eq!(first.synced_papers, 1);

    // The zeroed counter is skipped, not re-merged.
    let second = h.view_sync.run_cycle().await;
    assert_eq!(second.status, SyncOutcome::Success);
    assert_eq!(second.synced_papers, 0);
    assert_eq!(h.catalog.durable_views(record.id), Some(1));
}

#[tokio::test]
async fn upload_flushes_cached_search_results() {
    let h = harness();
    let uploader = Uuid::new_v4();
    h.papers
        .upload(uploader, sample_paper("First Paper"))
        .await
        .unwrap();

    let first = h
        .papers
        .search("", SortField::PublicationDate, SortOrder::Desc)
        .await
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(h.catalog.live_search_calls(), 1);

    // Second identical search is served from cache.
    h.papers
        .search("", SortField::PublicationDate, SortOrder::Desc)
        .await
        .unwrap();
    assert_eq!(h.catalog.live_search_calls(), 1);

    // A new paper invalidates the whole namespace; the next search goes live
    // and sees both papers.
    h.papers
        .upload(uploader, sample_paper("Second Paper"))
        .await
        .unwrap();
    let after = h
        .papers
        .search("", SortField::PublicationDate, SortOrder::Desc)
        .await
        .unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(h.catalog.live_search_calls(), 2);
}

#[tokio::test]
async fn detail_of_unknown_paper_is_not_found_but_still_counts_nothing_durable() {
    let h = harness();
    let ghost = Uuid::new_v4();

    let err = h.papers.detail(ghost).await.unwrap_err();
    assert!(matches!(
        err,
        folio::application::error::AppError::NotFound
    ));

    // The read-path increment fired before the durable lookup, so the ghost
    // counter exists; the sync cycle reports it as an orphan and leaves it.
    let report = h.view_sync.run_cycle().await;
    assert_eq!(report.status, SyncOutcome::PartialSuccess);
    assert_eq!(report.errors, vec![format!("paper not found: {ghost}")]);
    assert_eq!(
        h.kv.get(&view_counter_key(ghost)).await.unwrap().as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn upload_rejects_unknown_citations_without_touching_the_cache() {
    let h = harness();
    let uploader = Uuid::new_v4();
    h.papers
        .upload(uploader, sample_paper("Cited Paper"))
        .await
        .unwrap();

    // Warm the cache.
    h.papers
        .search("", SortField::PublicationDate, SortOrder::Desc)
        .await
        .unwrap();
    assert_eq!(h.catalog.live_search_calls(), 1);

    let mut bad = sample_paper("Citing Paper");
    bad.citations = vec![Uuid::new_v4().to_string()];
    let err = h.papers.upload(uploader, bad).await.unwrap_err();
    match err {
        folio::application::error::AppError::Validation { errors } => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("Citation not found:"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    // Failed upload must not invalidate: the warmed entry still serves.
    h.papers
        .search("", SortField::PublicationDate, SortOrder::Desc)
        .await
        .unwrap();
    assert_eq!(h.catalog.live_search_calls(), 1);
}

#[tokio::test]
async fn sync_status_reflects_pending_reads() {
    let h = harness();
    let record = h
        .papers
        .upload(Uuid::new_v4(), sample_paper("Status Paper"))
        .await
        .unwrap();
    h.papers.detail(record.id).await.unwrap();
    h.papers.detail(record.id).await.unwrap();

    let status = h.view_sync.pending_status().await;
    assert_eq!(status.pending_papers, 1);
    assert_eq!(status.pending_views, 2);
    assert_eq!(status.sample_keys, vec![view_counter_key(record.id)]);

    h.view_sync.run_cycle().await;

    let status = h.view_sync.pending_status().await;
    // The reset counter still exists under its key, with nothing pending.
    assert_eq!(status.pending_papers, 1);
    assert_eq!(status.pending_views, 0);
}
