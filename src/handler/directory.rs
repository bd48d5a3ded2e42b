//! Directory listing and stylesheet responses
//!
//! Both are answered from memory with a strong `ETag`; `If-None-Match`
//! short-circuits to 304.

use hyper::header::{
    HeaderMap, HeaderValue, CONTENT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, ETAG, VARY,
};
use hyper::StatusCode;

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::router::RequestContext;
use crate::http::cache::{check_etag_match, strong_etag};
use crate::http::negotiate::accepts;
use crate::http::response::insert_header;
use crate::http::{build_response, HttpResponse, ResponseBody};
use crate::listing::{self, locale, ListingStyle};
use crate::store::ResolvedDirectory;

const HTML_TYPE: &str = "text/html; charset=utf-8";
const CSS_TYPE: &str = "text/css; charset=utf-8";

/// Render and serve a directory listing
pub async fn serve_directory(
    ctx: &RequestContext<'_>,
    state: &AppState,
    dir: &ResolvedDirectory,
) -> Result<HttpResponse, ServeError> {
    let locale = locale::negotiate(ctx.accept_language, state.default_locale);
    let page = listing::render(&dir.store, &dir.path, locale).await?;
    let etag = strong_etag(&page.hash);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(HTML_TYPE));
    headers.insert(CONTENT_LANGUAGE, HeaderValue::from_static(page.locale.tag));
    headers.insert(VARY, HeaderValue::from_static("Accept-Language"));
    insert_header(&mut headers, ETAG, &etag);

    Ok(in_memory(ctx, headers, HTML_TYPE, &etag, page.html))
}

/// Serve the listing stylesheet
pub fn serve_stylesheet(ctx: &RequestContext<'_>, style: &ListingStyle) -> HttpResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CSS_TYPE));
    insert_header(&mut headers, ETAG, style.etag());

    in_memory(ctx, headers, CSS_TYPE, style.etag(), style.css().to_string())
}

fn in_memory(
    ctx: &RequestContext<'_>,
    mut headers: HeaderMap,
    content_type: &str,
    etag: &str,
    content: String,
) -> HttpResponse {
    if !accepts(ctx.accept, content_type) {
        return build_response(StatusCode::NOT_ACCEPTABLE, headers, ResponseBody::empty());
    }

    if check_etag_match(ctx.if_none_match, etag) {
        return build_response(StatusCode::NOT_MODIFIED, headers, ResponseBody::empty());
    }

    headers.insert(CONTENT_LENGTH, HeaderValue::from(content.len()));
    let body = if ctx.is_head {
        ResponseBody::empty()
    } else {
        ResponseBody::full(content)
    };
    build_response(StatusCode::OK, headers, body)
}
