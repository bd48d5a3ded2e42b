//! HTTP cache validation
//!
//! Provides `ETag` generation, `Last-Modified` formatting and the two
//! conditional checks the server honours (`If-None-Match`, `If-Modified-Since`).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

/// IMF-fixdate, RFC 9110 §5.6.7
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Hash content into a 64-bit hex digest
///
/// `DefaultHasher::new()` uses fixed keys, so the digest is stable across
/// processes for identical input.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Wrap a digest as a strong `ETag`, e.g. `"abc123def"`
pub fn strong_etag(hash: &str) -> String {
    format!("\"{hash}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Wildcard: `*`
///
/// Returns true if matched (should return 304), false otherwise
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

/// Format a modification time as an HTTP date in UTC
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

/// Check `If-Modified-Since` against the formatted `Last-Modified` value
///
/// The comparison is an exact string match, not a date comparison: a client
/// echoing back the value it was given gets a 304, anything else does not.
pub fn check_not_modified(if_modified_since: Option<&str>, last_modified: &str) -> bool {
    if_modified_since.is_some_and(|since| since.trim() == last_modified)
}
