use std::sync::Arc;

use sqlx::SqlitePool;

use crate::audit::Auditor;
use crate::config::AuditConfig;
use crate::content::ContentStore;
use crate::notify::Notifier;
use crate::probe::Prober;
use crate::repositories::BrokenLinkRepository;

#[derive(Clone)]
pub struct AppState {
    pub content_store: Arc<dyn ContentStore>,
    pub repo: BrokenLinkRepository,
    pub auditor: Arc<Auditor>,
    pub audit_config: AuditConfig,
    pub db_pool: SqlitePool,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        content_store: Arc<dyn ContentStore>,
        notifier: Arc<dyn Notifier>,
        audit_config: AuditConfig,
    ) -> Self {
        let repo = BrokenLinkRepository::new(pool.clone());
        let prober = Prober::new(audit_config.probe_timeout);
        let auditor = Arc::new(Auditor::new(
            content_store.clone(),
            repo.clone(),
            notifier,
            prober,
        ));
        Self {
            content_store,
            repo,
            auditor,
            audit_config,
            db_pool: pool,
        }
    }
}
