//! Audit orchestration: one full sweep over all published content,
//! producing a fresh broken-links table.
//!
//! A run clears the table, extracts candidate URLs from every record's
//! body and fields, filters the skip list, probes the survivors with a
//! bounded concurrent sweep, persists one row per failing occurrence, and
//! notifies when anything broke. Runs are serialized by a run-level lock:
//! a trigger that arrives while a sweep is in flight is rejected, never
//! allowed to interleave its clear/insert sequence with the running one.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::AuditConfig;
use crate::content::ContentStore;
use crate::extractor::{extract_urls, should_skip};
use crate::notify::{Notifier, broken_links_message};
use crate::probe::Prober;
use crate::repositories::BrokenLinkRepository;

/// Outcome of a completed audit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditSummary {
    pub records_scanned: u64,
    pub urls_checked: u64,
    pub broken_links: u64,
}

#[derive(Error, Debug)]
pub enum AuditError {
    /// A run was requested while another was in flight. Reported to the
    /// caller, never silently dropped.
    #[error("an audit run is already in progress")]
    AlreadyRunning,

    #[error("content store error: {0}")]
    Content(anyhow::Error),

    /// Persistence failure. Aborts the run's remaining writes and surfaces
    /// as a run-level failure; the process survives.
    #[error("result store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// One URL occurrence awaiting validation. The same URL appearing twice in
/// one record produces two candidates; occurrences are not deduplicated.
struct Candidate {
    content_id: i64,
    url: String,
    source_url: String,
}

pub struct Auditor {
    content: Arc<dyn ContentStore>,
    repo: BrokenLinkRepository,
    notifier: Arc<dyn Notifier>,
    prober: Prober,
    run_lock: tokio::sync::Mutex<()>,
}

impl Auditor {
    pub fn new(
        content: Arc<dyn ContentStore>,
        repo: BrokenLinkRepository,
        notifier: Arc<dyn Notifier>,
        prober: Prober,
    ) -> Self {
        Self {
            content,
            repo,
            notifier,
            prober,
            run_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Execute one full audit run.
    ///
    /// Returns [`AuditError::AlreadyRunning`] without touching the store
    /// when another run holds the lock (scheduled and manual triggers can
    /// race). A single URL's validation failure never aborts the run; only
    /// store-level failures do.
    #[instrument(skip_all, fields(run_id = %Uuid::new_v4()))]
    pub async fn run(&self, config: &AuditConfig) -> Result<AuditSummary, AuditError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| AuditError::AlreadyRunning)?;

        // Full-replace semantics: the table only ever reflects the most
        // recent completed run.
        self.repo.clear_all().await?;

        let records = self
            .content
            .list_published()
            .await
            .map_err(AuditError::Content)?;
        let records_scanned = records.len() as u64;

        let mut candidates: Vec<Candidate> = Vec::new();
        for record in &records {
            let mut urls = extract_urls(&record.body);
            for (_, value) in &record.fields {
                for text in value.values() {
                    urls.extend(extract_urls(text));
                }
            }
            for url in urls {
                if should_skip(&url, &config.skip_urls) {
                    debug!(url = %url, content_id = record.id, "skip-listed, not checked");
                    continue;
                }
                candidates.push(Candidate {
                    content_id: record.id,
                    url,
                    source_url: record.permalink.clone(),
                });
            }
        }
        let urls_checked = candidates.len() as u64;

        // Bounded concurrent sweep. `buffered` keeps candidate order, so
        // rows land in the table in discovery order. Verdicts are collected
        // before any insert: the store transitions straight from cleared to
        // fully repopulated.
        let prober = &self.prober;
        let verdicts: Vec<(Candidate, Result<(), crate::probe::ProbeError>)> =
            stream::iter(candidates.into_iter().map(|candidate| async move {
                let verdict = prober.check(&candidate.url).await;
                (candidate, verdict)
            }))
            .buffered(config.concurrency)
            .collect()
            .await;

        let detected_at = Utc::now();
        let mut broken_links = 0u64;
        for (candidate, verdict) in verdicts {
            if let Err(reason) = verdict {
                debug!(
                    url = %candidate.url,
                    content_id = candidate.content_id,
                    %reason,
                    "broken link"
                );
                self.repo
                    .insert(
                        candidate.content_id,
                        &candidate.url,
                        &candidate.source_url,
                        detected_at,
                    )
                    .await?;
                broken_links += 1;
            }
        }

        if broken_links > 0 {
            let (subject, body) = broken_links_message(broken_links);
            if let Err(err) = self
                .notifier
                .notify(&config.notification_email, &subject, &body)
                .await
            {
                warn!(%err, "broken-link notification failed");
            }
        }

        let summary = AuditSummary {
            records_scanned,
            urls_checked,
            broken_links,
        };
        info!(
            records = summary.records_scanned,
            urls = summary.urls_checked,
            broken = summary.broken_links,
            "audit run complete"
        );
        Ok(summary)
    }
}
