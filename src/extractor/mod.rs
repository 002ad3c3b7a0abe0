//! Lexical URL extraction and skip-list filtering.
//!
//! Extraction is a pattern scan, not a URI-grammar parse. It finds every
//! absolute http(s) URL in a blob of text or markup, in order of first
//! appearance, duplicates included.

use once_cell::sync::Lazy;
use regex::Regex;

// Scheme plus one-or-more characters from the allowed URL set. Because this
// is a lexical scan, trailing sentence punctuation adjacent to a URL (e.g.
// "see http://x/y." capturing "http://x/y.") is included in the match. That
// approximation is intentional; tightening it would change which URLs get
// probed and reported.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=]+")
        .expect("URL pattern must compile")
});

/// Scan `text` for absolute http(s) URLs.
///
/// Never fails: malformed or empty input simply yields no matches.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Exact-match skip check. No normalization, no wildcards, no
/// trailing-slash canonicalization; operators list the URLs verbatim.
pub fn should_skip(url: &str, skip_list: &[String]) -> bool {
    skip_list.iter().any(|skipped| skipped == url)
}
