//! Operator-triggered removal of a broken reference from its source
//! content.
//!
//! Content here is mostly free text with occasional inline markup, so the
//! edit is a layered text transform rather than a DOM rewrite. Three passes
//! run in priority order per field value, stopping at the first that
//! matches: anchor unwrap (keep the label text), image strip (drop the
//! whole tag), bare substring strip.

use regex::Regex;
use thiserror::Error;
use tracing::{info, instrument};

use crate::content::{ContentStore, FieldValue};
use crate::repositories::BrokenLinkRepository;

#[derive(Error, Debug)]
pub enum RemediationError {
    /// The target content record no longer exists; nothing was mutated.
    #[error("content record {0} not found")]
    ContentNotFound(i64),

    #[error("content store error: {0}")]
    Content(anyhow::Error),

    #[error("result store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Apply the three-pass removal to one text value. Returns the edited text
/// when a pass matched, `None` when the URL does not occur.
fn strip_url(text: &str, url: &str) -> Option<String> {
    let escaped = regex::escape(url);

    // Pass 1: the URL is the href of an anchor tag. Unwrap rather than
    // delete, preserving the link's label text.
    let anchor = Regex::new(&format!(
        r#"(?is)<a\b[^>]*href\s*=\s*["']?{escaped}["']?[^>]*>(.*?)</a>"#
    ))
    .expect("anchor pattern from escaped URL must compile");
    if anchor.is_match(text) {
        return Some(anchor.replace_all(text, "$1").into_owned());
    }

    // Pass 2: the URL is the src of an image tag. Delete the whole tag.
    let image = Regex::new(&format!(
        r#"(?is)<img\b[^>]*src\s*=\s*["']?{escaped}["']?[^>]*/?>"#
    ))
    .expect("image pattern from escaped URL must compile");
    if image.is_match(text) {
        return Some(image.replace_all(text, "").into_owned());
    }

    // Pass 3: bare occurrence. Strip the substring; surrounding whitespace
    // is left as-is.
    if text.contains(url) {
        return Some(text.replace(url, ""));
    }

    None
}

/// Remove every occurrence of `url` from the record's body and fields,
/// writing back only the values that changed. Returns true iff at least one
/// occurrence was found and removed anywhere; on success the matching rows
/// are deleted from the result store.
#[instrument(skip(store, repo))]
pub async fn remove_link(
    store: &dyn ContentStore,
    repo: &BrokenLinkRepository,
    content_id: i64,
    url: &str,
) -> Result<bool, RemediationError> {
    let record = store
        .get(content_id)
        .await
        .map_err(RemediationError::Content)?
        .ok_or(RemediationError::ContentNotFound(content_id))?;

    let mut removed = false;

    if let Some(edited) = strip_url(&record.body, url) {
        store
            .update_body(content_id, &edited)
            .await
            .map_err(RemediationError::Content)?;
        removed = true;
    }

    for (name, value) in &record.fields {
        let replacement = match value {
            FieldValue::Single(text) => strip_url(text, url).map(FieldValue::Single),
            FieldValue::Many(texts) => {
                let mut changed = false;
                let edited: Vec<String> = texts
                    .iter()
                    .map(|text| match strip_url(text, url) {
                        Some(edited) => {
                            changed = true;
                            edited
                        }
                        None => text.clone(),
                    })
                    .collect();
                changed.then_some(FieldValue::Many(edited))
            }
        };
        if let Some(value) = replacement {
            store
                .update_field(content_id, name, value)
                .await
                .map_err(RemediationError::Content)?;
            removed = true;
        }
    }

    if removed {
        let rows = repo.delete_where(content_id, url).await?;
        info!(content_id, url, rows, "removed broken link from content");
    }

    Ok(removed)
}
