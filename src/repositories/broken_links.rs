use crate::entities::BrokenLink;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Repository for the broken-links table.
///
/// The table has full-replace semantics across audit runs: the orchestrator
/// clears it at run start and repopulates it from that run's verdicts. The
/// store itself enforces no uniqueness on (content_id, url); duplicates
/// within one run are legitimate, one row per occurrence.
#[derive(Clone)]
pub struct BrokenLinkRepository {
    pool: SqlitePool,
}

impl BrokenLinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Drop every row. Called once at the start of each audit run.
    pub async fn clear_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM broken_links")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert(
        &self,
        content_id: i64,
        url: &str,
        source_url: &str,
        detected_at: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO broken_links (content_id, url, source_url, detected_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(content_id)
        .bind(url)
        .bind(source_url)
        .bind(detected_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// All rows in insertion order, for the admin listing.
    pub async fn list_all(&self) -> Result<Vec<BrokenLink>, sqlx::Error> {
        sqlx::query_as::<_, BrokenLink>(
            "SELECT id, content_id, url, source_url, detected_at
             FROM broken_links
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Delete every row matching (content_id, url). A single statement, so
    /// it is atomic with respect to a concurrently running audit.
    pub async fn delete_where(&self, content_id: i64, url: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM broken_links WHERE content_id = ? AND url = ?")
            .bind(content_id)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM broken_links")
            .fetch_one(&self.pool)
            .await
    }
}
