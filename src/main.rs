use std::{process, sync::Arc};

use apalis::{
    layers::WorkerBuilderExt,
    prelude::{Monitor, WorkerBuilder, WorkerFactoryFn},
};
use apalis_cron::CronStream;
use folio::{
    application::{
        auth::AuthService,
        error::AppError,
        jobs::{ViewSyncJobContext, process_view_sync_job, view_sync_schedule},
        papers::PaperService,
        repos::{PapersRepo, UsersRepo},
        view_sync::ViewSyncService,
    },
    cache::{KvStore, MemoryKv, SearchCache, ViewCounters},
    config,
    infra::{db::PostgresRepositories, error::InfraError, http, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let repositories = init_repositories(&settings).await?;
    let app = build_application_context(repositories, &settings);

    let monitor_handle = settings
        .sync
        .enabled
        .then(|| spawn_sync_monitor(app.view_sync.clone(), settings.sync.interval_minutes));
    if !settings.sync.enabled {
        info!(target = "folio::main", "periodic view sync disabled by configuration");
    }

    let result = serve_http(&settings, app.http_state).await;

    if let Some(handle) = monitor_handle {
        handle.abort();
        let _ = handle.await;
    }

    result
}

struct ApplicationContext {
    http_state: http::HttpState,
    view_sync: Arc<ViewSyncService>,
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> ApplicationContext {
    let kv: Arc<dyn KvStore> = Arc::new(MemoryKv::new());
    let papers_repo: Arc<dyn PapersRepo> = repositories.clone();
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();

    let counters = ViewCounters::new(kv.clone());
    let search_cache = SearchCache::new(kv.clone(), settings.cache.search_ttl);

    let papers = Arc::new(PaperService::new(papers_repo.clone(), counters, search_cache));
    let auth = Arc::new(AuthService::new(users_repo));
    let view_sync = Arc::new(ViewSyncService::new(kv.clone(), papers_repo));

    let http_state = http::HttpState {
        app_name: settings.app_name.clone(),
        papers,
        auth,
        view_sync: view_sync.clone(),
        db: repositories,
        kv,
    };

    ApplicationContext {
        http_state,
        view_sync,
    }
}

fn spawn_sync_monitor(
    view_sync: Arc<ViewSyncService>,
    interval_minutes: u32,
) -> tokio::task::JoinHandle<()> {
    let context = ViewSyncJobContext { view_sync };
    let worker = WorkerBuilder::new("view-sync-worker")
        .data(context)
        .backend(CronStream::new(view_sync_schedule(interval_minutes)))
        .build_fn(process_view_sync_job);

    let monitor = Monitor::new().register(worker);

    info!(
        target = "folio::main",
        interval_minutes, "periodic view sync scheduled"
    );

    tokio::spawn(async move {
        if let Err(err) = monitor.run().await {
            error!(error = %err, "job monitor stopped");
        }
    })
}

async fn serve_http(
    settings: &config::Settings,
    http_state: http::HttpState,
) -> Result<(), AppError> {
    let router = http::build_router(http_state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(target = "folio::main", addr = %settings.server.addr, "listening");

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
