use std::sync::Arc;

use crate::application::auth::AuthService;
use crate::application::papers::PaperService;
use crate::application::view_sync::ViewSyncService;
use crate::cache::KvStore;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct HttpState {
    pub app_name: String,
    pub papers: Arc<PaperService>,
    pub auth: Arc<AuthService>,
    pub view_sync: Arc<ViewSyncService>,
    pub db: Arc<PostgresRepositories>,
    pub kv: Arc<dyn KvStore>,
}
