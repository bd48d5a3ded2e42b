//! Static file serving module
//!
//! Builds the response for a resolved file: type and disposition from the
//! extension, sidecar overrides, then `Accept`, `If-Modified-Since` and
//! `Range` in that order. Bytes are streamed from the open handle.

use std::io::SeekFrom;

use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_RANGES, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_RANGE,
    CONTENT_TYPE, LAST_MODIFIED,
};
use hyper::StatusCode;
use tokio::io::AsyncSeekExt;

use crate::error::ServeError;
use crate::handler::router::RequestContext;
use crate::http::cache::{check_not_modified, format_http_date};
use crate::http::disposition::content_disposition;
use crate::http::negotiate::accepts;
use crate::http::response::insert_header;
use crate::http::{
    self, build_416_response, build_response, mime, FileWindow, HttpResponse, RangeOutcome,
    ResponseBody,
};
use crate::store::{load_overrides, ResolvedFile};

/// Serve a resolved file
pub async fn serve_file(ctx: &RequestContext<'_>, mut file: ResolvedFile) -> Result<HttpResponse, ServeError> {
    let name = file.name();
    let entry = mime::lookup(file.extension());
    let last_modified = format_http_date(file.modified);

    let mut headers = HeaderMap::new();
    insert_header(&mut headers, CONTENT_TYPE, entry.content_type);
    insert_header(
        &mut headers,
        CONTENT_DISPOSITION,
        &content_disposition(&name, entry.download),
    );
    insert_header(&mut headers, LAST_MODIFIED, &last_modified);
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    // Sidecar values replace computed ones of the same name
    headers.extend(load_overrides(file.directory(), &name).await);

    // Negotiate on what is actually sent
    let content_type = effective(&headers, CONTENT_TYPE, entry.content_type);
    if !accepts(ctx.accept, &content_type) {
        tracing::debug!(path = ctx.path, content_type = %content_type, "not acceptable");
        return Ok(build_response(StatusCode::NOT_ACCEPTABLE, headers, ResponseBody::empty()));
    }

    let last_modified = effective(&headers, LAST_MODIFIED, &last_modified);
    if check_not_modified(ctx.if_modified_since, &last_modified) {
        return Ok(build_response(StatusCode::NOT_MODIFIED, headers, ResponseBody::empty()));
    }

    let (status, window) = match http::negotiate_range(ctx.range, file.len) {
        RangeOutcome::Unsatisfiable { total } => {
            return Ok(build_416_response(headers, total));
        }
        RangeOutcome::Full(window) => (StatusCode::OK, window),
        RangeOutcome::Partial(window) => {
            insert_header(&mut headers, CONTENT_RANGE, &window.content_range());
            (StatusCode::PARTIAL_CONTENT, window)
        }
    };

    headers.insert(CONTENT_LENGTH, HeaderValue::from(window.len()));

    let body = if ctx.is_head || window.is_empty() {
        ResponseBody::empty()
    } else {
        if window.start > 0 {
            file.file.seek(SeekFrom::Start(window.start)).await?;
        }
        FileWindow::new(file.file, window.len()).into()
    };

    Ok(build_response(status, headers, body))
}

/// Header value as it will go out, or `computed` if it is not valid text
fn effective(headers: &HeaderMap, name: HeaderName, computed: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(computed)
        .to_string()
}
