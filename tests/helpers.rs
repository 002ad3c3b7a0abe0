use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::Mutex;

use linkmender::{
    config::AuditConfig,
    content::{ContentRecord, FieldValue},
    notify::Notifier,
    repositories,
};

/// Fresh in-memory database with the schema applied. Single connection so
/// every query sees the same database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory database");
    repositories::run_migrations(&pool)
        .await
        .expect("run migrations");
    pool
}

/// Audit settings for tests: defaults plus a short probe timeout.
pub fn audit_config() -> AuditConfig {
    AuditConfig {
        probe_timeout: Duration::from_secs(5),
        ..AuditConfig::default()
    }
}

pub fn record(id: i64, body: &str, fields: Vec<(String, FieldValue)>) -> ContentRecord {
    ContentRecord {
        id,
        body: body.to_string(),
        permalink: format!("http://site.example/{id}"),
        fields,
    }
}

/// Notifier that records every delivery for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn deliveries(&self) -> Vec<(String, String, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        self.sent.lock().await.push((
            recipient.to_string(),
            subject.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}
