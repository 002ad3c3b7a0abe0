use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A broken reference discovered during an audit run.
///
/// Rows live for exactly one audit cycle: the table is cleared at the start
/// of every run and repopulated from that run's verdicts. An individual row
/// is also removed when an operator deletes the link via remediation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct BrokenLink {
    pub id: i64,
    /// Id of the content record that referenced the failing URL. The record
    /// itself is owned by the content store, not by this table.
    pub content_id: i64,
    /// The URL that failed validation.
    pub url: String,
    /// Human-facing permalink of the content that referenced it.
    pub source_url: String,
    pub detected_at: DateTime<Utc>,
}
