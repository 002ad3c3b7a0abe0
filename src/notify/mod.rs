//! Outbound notification interface.
//!
//! The audit fires one notification per run when broken links were found.
//! Delivery is fire-and-forget: a failing notifier is logged by the caller
//! and never fails the run.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}

/// Notifier that writes to the log instead of an outbound channel. Stands
/// in wherever no mail transport is wired up.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        info!(recipient, subject, body, "notification");
        Ok(())
    }
}

/// Compose the (subject, body) pair for a broken-links notification.
pub fn broken_links_message(count: u64) -> (String, String) {
    let subject = "Broken Links Found".to_string();
    let body = format!(
        "There are {count} broken links detected on your website.\n\n\
         You can review and manage them via the broken links listing."
    );
    (subject, body)
}
