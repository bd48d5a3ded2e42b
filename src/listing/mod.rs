//! Directory listing module
//!
//! Renders a directory as a small HTML page and serves the stylesheet it
//! links to. Listings only exist when a listing colour is configured.

pub mod locale;

use std::fmt::Write as _;
use std::io;
use std::path::{Component, Path};
use std::time::SystemTime;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tokio::fs;

use crate::error::StartupError;
use crate::http::cache::{content_hash, format_http_date, strong_etag};
use crate::store::OVERRIDE_FILE_NAME;

pub use locale::Locale;

/// Request path of the in-memory listing stylesheet
pub const STYLESHEET_PATH: &str = "/.beg_sm_listing.css";

/// Characters escaped inside a single path segment of a link
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Stylesheet for listings, fixed for the life of the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingStyle {
    css: String,
    etag: String,
}

impl ListingStyle {
    /// `off` disables listings; anything else must be a plain CSS colour value
    pub fn from_color(color: &str) -> Result<Option<Self>, StartupError> {
        let color = color.trim();
        if color.eq_ignore_ascii_case("off") {
            return Ok(None);
        }
        if color.is_empty()
            || color
                .chars()
                .any(|c| c.is_control() || matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\''))
        {
            return Err(StartupError::ListingColor(color.to_string()));
        }

        let css = format!(
            "body{{color:white;background-color:{color};font-family:sans-serif;margin:2em}}\n\
             a{{color:inherit}}\n\
             table{{border-collapse:collapse}}\n\
             th,td{{padding:.2em 1em;text-align:left}}\n\
             td.size{{text-align:right}}\n"
        );
        let etag = strong_etag(&content_hash(css.as_bytes()));
        Ok(Some(Self { css, etag }))
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn etag(&self) -> &str {
        &self.etag
    }
}

/// A rendered listing page
#[derive(Debug, Clone)]
pub struct RenderedListing {
    pub html: String,
    /// Hex digest of `html`, stable while the directory is unchanged
    pub hash: String,
    pub locale: Locale,
}

struct Entry {
    name: String,
    is_dir: bool,
    len: u64,
    modified: SystemTime,
}

/// Render `directory`, which must lie inside `store_root`
pub async fn render(store_root: &Path, directory: &Path, locale: Locale) -> io::Result<RenderedListing> {
    let mut entries = read_entries(directory).await?;
    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });

    let segments = relative_segments(store_root, directory);
    let display_path = format!("/{}", segments.iter().map(|s| format!("{s}/")).collect::<String>());
    let base_href = format!(
        "/{}",
        segments
            .iter()
            .map(|s| format!("{}/", utf8_percent_encode(s, PATH_SEGMENT)))
            .collect::<String>()
    );
    let title = format!(
        "{} {}",
        locale.index_of,
        html_escape::encode_text(&display_path)
    );

    let mut html = String::with_capacity(1024 + entries.len() * 160);
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<link rel=\"stylesheet\" href=\"{STYLESHEET_PATH}\">\n\
         </head>\n<body>\n<h1>{title}</h1>\n<table>\n\
         <tr><th>{}</th><th>{}</th><th>{}</th></tr>\n",
        locale.tag, locale.name, locale.size, locale.modified
    );

    if let Some((_, parents)) = segments.split_last() {
        let parent_href = format!(
            "/{}",
            parents
                .iter()
                .map(|s| format!("{}/", utf8_percent_encode(s, PATH_SEGMENT)))
                .collect::<String>()
        );
        let _ = writeln!(
            html,
            "<tr><td><a href=\"{parent_href}\">../</a></td><td class=\"size\">-</td><td>{}</td></tr>",
            locale.parent
        );
    }

    for entry in &entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        let size = if entry.is_dir {
            "-".to_string()
        } else {
            entry.len.to_string()
        };
        let _ = writeln!(
            html,
            "<tr><td><a href=\"{base_href}{}{suffix}\">{}{suffix}</a></td><td class=\"size\">{size}</td><td>{}</td></tr>",
            utf8_percent_encode(&entry.name, PATH_SEGMENT),
            html_escape::encode_text(&entry.name),
            format_http_date(entry.modified),
        );
    }

    html.push_str("</table>\n</body>\n</html>\n");

    let hash = content_hash(html.as_bytes());
    Ok(RenderedListing { html, hash, locale })
}

async fn read_entries(directory: &Path) -> io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut dir = fs::read_dir(directory).await?;

    while let Some(dir_entry) = dir.next_entry().await? {
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        if name == OVERRIDE_FILE_NAME {
            continue;
        }

        // Follow symlinks; dangling ones are left out
        let Ok(metadata) = fs::metadata(dir_entry.path()).await else {
            continue;
        };

        entries.push(Entry {
            name,
            is_dir: metadata.is_dir(),
            len: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }

    Ok(entries)
}

fn relative_segments(store_root: &Path, directory: &Path) -> Vec<String> {
    directory
        .strip_prefix(store_root)
        .map(|rel| {
            rel.components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}
