//! Per-directory header overrides
//!
//! A sidecar file in a file's directory may inject response headers for that
//! file. Format, one directive per line:
//!
//! ```text
//! # comment
//! target=video.mp4
//! Cache-Control: public, max-age=86400
//! X-Robots-Tag: noindex
//!
//! target=index.html
//! Cache-Control: no-cache
//! ```
//!
//! `target=` opens a section; header lines follow until a line without a
//! colon closes it. Only sections whose target equals the served file name
//! apply, and later values for the same header win. Anything unreadable or
//! malformed degrades to "no overrides".

use std::io;
use std::path::Path;

use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::fs;

/// Fixed sidecar file name, looked up next to the served file
pub const OVERRIDE_FILE_NAME: &str = "beg_sm_local_modifier.txt";

/// Sidecars larger than this are ignored
const MAX_OVERRIDE_FILE_SIZE: u64 = 64 * 1024;

/// Load the overrides that apply to `file_name` inside `directory`
pub async fn load_overrides(directory: &Path, file_name: &str) -> HeaderMap {
    let path = directory.join(OVERRIDE_FILE_NAME);

    match fs::metadata(&path).await {
        Ok(meta) if meta.len() > MAX_OVERRIDE_FILE_SIZE => {
            crate::logger::log_warning(&format!(
                "Ignoring oversized header override file '{}' ({} bytes)",
                path.display(),
                meta.len()
            ));
            return HeaderMap::new();
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return HeaderMap::new(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "override file not readable");
            return HeaderMap::new();
        }
    }

    match fs::read_to_string(&path).await {
        Ok(content) => parse_overrides(&content, file_name),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "override file not readable");
            HeaderMap::new()
        }
    }
}

/// Parse sidecar content, keeping only sections targeting `file_name`
pub fn parse_overrides(content: &str, file_name: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    // None: outside any section; Some(applies): inside one
    let mut section: Option<bool> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(target) = line.strip_prefix("target=") {
            section = Some(target.trim() == file_name);
            continue;
        }

        let Some(applies) = section else {
            continue;
        };

        let Some((name, value)) = line.split_once(':') else {
            section = None;
            continue;
        };

        if !applies {
            continue;
        }

        match (
            HeaderName::from_bytes(name.trim().as_bytes()),
            HeaderValue::from_str(value.trim()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::debug!(line, "skipping malformed override header"),
        }
    }

    headers
}
