//! MIME type table
//!
//! Maps a file extension to its Content-Type and whether browsers should be
//! told to download it (`attachment`) rather than display it (`inline`).

/// Content-Type plus disposition policy for one extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimeEntry {
    pub content_type: &'static str,
    pub download: bool,
}

impl MimeEntry {
    const fn inline(content_type: &'static str) -> Self {
        Self {
            content_type,
            download: false,
        }
    }

    const fn download(content_type: &'static str) -> Self {
        Self {
            content_type,
            download: true,
        }
    }
}

/// Unknown extensions are served as opaque downloads
pub const DEFAULT_ENTRY: MimeEntry = MimeEntry::download("application/octet-stream");

/// Look up the MIME entry for a file extension (case-insensitive)
///
/// # Examples
/// ```
/// use static_microserver::http::mime::lookup;
/// assert_eq!(lookup(Some("HTML")).content_type, "text/html; charset=utf-8");
/// assert!(!lookup(Some("mp4")).download);
/// assert!(lookup(None).download);
/// ```
pub fn lookup(extension: Option<&str>) -> MimeEntry {
    let Some(ext) = extension else {
        return DEFAULT_ENTRY;
    };

    match ext.to_ascii_lowercase().as_str() {
        // Text
        "html" | "htm" => MimeEntry::inline("text/html; charset=utf-8"),
        "css" => MimeEntry::inline("text/css; charset=utf-8"),
        "txt" | "md" | "log" => MimeEntry::inline("text/plain; charset=utf-8"),
        "csv" => MimeEntry::download("text/csv; charset=utf-8"),
        "xml" => MimeEntry::inline("application/xml"),

        // JavaScript/WASM
        "js" | "mjs" => MimeEntry::inline("text/javascript; charset=utf-8"),
        "json" => MimeEntry::inline("application/json"),
        "wasm" => MimeEntry::inline("application/wasm"),

        // Images
        "png" => MimeEntry::inline("image/png"),
        "jpg" | "jpeg" => MimeEntry::inline("image/jpeg"),
        "gif" => MimeEntry::inline("image/gif"),
        "svg" => MimeEntry::inline("image/svg+xml"),
        "ico" => MimeEntry::inline("image/x-icon"),
        "webp" => MimeEntry::inline("image/webp"),
        "avif" => MimeEntry::inline("image/avif"),

        // Video
        "mp4" => MimeEntry::inline("video/mp4"),
        "webm" => MimeEntry::inline("video/webm"),
        "ogv" => MimeEntry::inline("video/ogg"),
        "mov" => MimeEntry::inline("video/quicktime"),
        "avi" => MimeEntry::download("video/x-msvideo"),

        // Audio
        "mp3" => MimeEntry::inline("audio/mpeg"),
        "wav" => MimeEntry::inline("audio/wav"),
        "flac" => MimeEntry::inline("audio/flac"),
        "ogg" | "oga" => MimeEntry::inline("audio/ogg"),
        "m4a" => MimeEntry::inline("audio/mp4"),

        // Fonts
        "woff" => MimeEntry::inline("font/woff"),
        "woff2" => MimeEntry::inline("font/woff2"),
        "ttf" => MimeEntry::inline("font/ttf"),
        "otf" => MimeEntry::inline("font/otf"),

        // Documents and archives
        "pdf" => MimeEntry::inline("application/pdf"),
        "zip" => MimeEntry::download("application/zip"),
        "gz" | "gzip" => MimeEntry::download("application/gzip"),
        "tar" => MimeEntry::download("application/x-tar"),
        "7z" => MimeEntry::download("application/x-7z-compressed"),
        "jar" => MimeEntry::download("application/java-archive"),

        _ => DEFAULT_ENTRY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(lookup(Some("html")).content_type, "text/html; charset=utf-8");
        assert_eq!(lookup(Some("css")).content_type, "text/css; charset=utf-8");
        assert_eq!(lookup(Some("json")).content_type, "application/json");
        assert_eq!(lookup(Some("png")).content_type, "image/png");
        assert_eq!(lookup(Some("mp4")).content_type, "video/mp4");
    }

    #[test]
    fn test_disposition_policy() {
        assert!(!lookup(Some("png")).download);
        assert!(lookup(Some("zip")).download);
        assert!(lookup(Some("tar")).download);
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(lookup(Some("xyz")), DEFAULT_ENTRY);
        assert_eq!(lookup(None), DEFAULT_ENTRY);
        assert!(DEFAULT_ENTRY.download);
    }
}
