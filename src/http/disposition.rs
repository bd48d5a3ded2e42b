//! Content-Disposition header construction
//!
//! Emits both the legacy quoted `filename=` parameter (ASCII only) and the
//! RFC 5987 / RFC 6266 `filename*=UTF-8''...` parameter carrying the exact name.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// RFC 5987 `attr-char`: everything else is percent-encoded
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Build the `Content-Disposition` value for a served file
///
/// # Examples
/// ```
/// use static_microserver::http::disposition::content_disposition;
/// assert_eq!(
///     content_disposition("report.pdf", false),
///     "inline; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
/// );
/// ```
pub fn content_disposition(file_name: &str, download: bool) -> String {
    let kind = if download { "attachment" } else { "inline" };
    format!(
        "{kind}; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_fallback(file_name),
        utf8_percent_encode(file_name, ATTR_CHAR)
    )
}

/// Transliterate a name into something safe inside a quoted-string
fn ascii_fallback(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect()
}
