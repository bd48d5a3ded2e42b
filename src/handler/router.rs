//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, body drain,
//! authentication, then dispatch to the stylesheet, a file or a listing.

use crate::auth;
use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::{directory, static_files};
use crate::http::response::{apply_policy_headers, build_empty_response};
use crate::http::{self, HttpResponse};
use crate::listing::STYLESHEET_PATH;
use crate::logger::{self, AccessLogEntry};
use crate::store::{decode_request_path, resolve, Resolved};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_LENGTH,
    IF_MODIFIED_SINCE, IF_NONE_MATCH, RANGE, REFERER, USER_AGENT,
};
use hyper::http::request::Parts;
use hyper::{Method, Request, StatusCode};
use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Decoded request path, always starting with `/`
    pub path: &'a str,
    pub is_head: bool,
    pub accept: Option<&'a str>,
    pub accept_language: Option<&'a str>,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub range: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    fn new(path: &'a str, route: Route, headers: &'a HeaderMap) -> Self {
        Self {
            path,
            is_head: route == Route::Head,
            accept: header_str(headers, ACCEPT),
            accept_language: header_str(headers, ACCEPT_LANGUAGE),
            if_none_match: header_str(headers, IF_NONE_MATCH),
            if_modified_since: header_str(headers, IF_MODIFIED_SINCE),
            range: header_str(headers, RANGE),
        }
    }
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Methods with a handler; anything else is answered with 405
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Get,
    Head,
}

impl Route {
    fn for_method(method: &Method) -> Option<Self> {
        match method {
            &Method::GET => Some(Self::Get),
            &Method::HEAD => Some(Self::Head),
            _ => None,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<HttpResponse, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();

    let mut response = dispatch(&parts, body, &state).await;
    apply_policy_headers(
        response.headers_mut(),
        &state.config.http.server_name,
        state.config.http.enable_cors,
    );

    if state.config.logging.access_log {
        log_access(&parts, &response, &state, peer, started);
    }

    Ok(response)
}

async fn dispatch<B>(parts: &Parts, body: B, state: &AppState) -> HttpResponse
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    // 1. Check HTTP method
    let Some(route) = Route::for_method(&parts.method) else {
        logger::log_warning(&format!("Method not allowed: {}", parts.method));
        return http::build_405_response();
    };

    // 2. Drain the body so the connection can be reused
    if let Some(resp) = drain_body(&parts.headers, body, state.config.performance.max_body_size).await {
        return resp;
    }

    // 3. Authentication gate
    if let Some(resp) = auth::check_auth(&parts.headers, &state.credentials) {
        return resp;
    }

    // 4. Decode path
    let path = match decode_request_path(parts.uri.path()) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(path = parts.uri.path(), error = %e, "undecodable request path");
            return http::build_404_response();
        }
    };
    let ctx = RequestContext::new(&path, route, &parts.headers);

    // 5. Listing stylesheet, answered from memory
    if let Some(style) = &state.listing {
        if ctx.path == STYLESHEET_PATH {
            return directory::serve_stylesheet(&ctx, style);
        }
    }

    // 6. Resolve against the stores
    match serve_resolved(&ctx, state).await {
        Ok(resp) => resp,
        Err(e) => {
            if e.is_unexpected() {
                logger::log_error(&format!("Failed to serve '{}': {e}", ctx.path));
            } else {
                tracing::debug!(path = ctx.path, error = %e, "treating as not found");
            }
            http::build_404_response()
        }
    }
}

async fn serve_resolved(ctx: &RequestContext<'_>, state: &AppState) -> Result<HttpResponse, ServeError> {
    match resolve(&state.stores, ctx.path, state.listing_enabled()).await? {
        Resolved::File(file) => static_files::serve_file(ctx, file).await,
        Resolved::Directory(dir) => directory::serve_directory(ctx, state, &dir).await,
        Resolved::NotFound => {
            logger::log_not_found(ctx.path);
            Ok(http::build_404_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<HttpResponse> {
    let size = headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()?;

    (size > max_body_size).then(|| {
        logger::log_warning(&format!(
            "Request body too large: {size} bytes (max: {max_body_size})"
        ));
        http::build_413_response()
    })
}

/// Read and discard the request body, bounded by `max_body_size`
async fn drain_body<B>(headers: &HeaderMap, body: B, max_body_size: u64) -> Option<HttpResponse>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    if let Some(resp) = check_body_size(headers, max_body_size) {
        return Some(resp);
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(_) => None,
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!(
                "Request body exceeded {max_body_size} bytes while draining"
            ));
            Some(http::build_413_response())
        }
        Err(e) => {
            tracing::debug!(error = %e, "failed to read request body");
            let mut resp = build_empty_response(StatusCode::BAD_REQUEST);
            resp.headers_mut()
                .insert(CONNECTION, HeaderValue::from_static("close"));
            Some(resp)
        }
    }
}

fn log_access(
    parts: &Parts,
    response: &HttpResponse,
    state: &AppState,
    peer: SocketAddr,
    started: Instant,
) {
    let mut entry = AccessLogEntry::new(peer.ip().to_string(), parts.method.as_str(), parts.uri.path());
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", parts.version)
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header_str(&parts.headers, REFERER).map(ToString::to_string);
    entry.user_agent = header_str(&parts.headers, USER_AGENT).map(ToString::to_string);
    // 2xx and 3xx are only reachable once the gate has passed
    let status = response.status();
    if !state.credentials.is_empty() && (status.is_success() || status.is_redirection()) {
        entry.user = auth::basic_user(&parts.headers);
    }
    entry.set_elapsed(started.elapsed());

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use http_body_util::{Empty, Full};
    use hyper::body::Bytes;
    use hyper::header::{ALLOW, AUTHORIZATION, ETAG, X_CONTENT_TYPE_OPTIONS};
    use std::path::Path;

    const PEER: SocketAddr = SocketAddr::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
        40000,
    );

    fn state_for(store: &Path, credentials: &[&str], color: &str) -> Arc<AppState> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();

        let mut config = Config::load_from(Some(&path)).unwrap();
        config.stores = vec![store.to_path_buf()];
        config.credentials = credentials.iter().map(ToString::to_string).collect();
        config.listing.color = color.to_string();
        config.logging.access_log = false;
        config.performance.max_body_size = 4;
        Arc::new(AppState::new(config).unwrap())
    }

    fn store() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a b.txt"), "hello").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs").join("x.txt"), "x").unwrap();
        dir
    }

    async fn send(state: &Arc<AppState>, req: Request<Empty<Bytes>>) -> HttpResponse {
        handle_request(req, Arc::clone(state), PEER).await.unwrap()
    }

    fn get(uri: &str) -> hyper::http::request::Builder {
        Request::builder().method(Method::GET).uri(uri)
    }

    #[tokio::test]
    async fn test_method_not_allowed_closes() {
        let dir = store();
        let state = state_for(dir.path(), &[], "off");
        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/a%20b.txt")
            .body(Empty::new())
            .unwrap();

        let resp = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "GET, HEAD");
        assert_eq!(resp.headers()[CONNECTION], "close");
        assert_eq!(resp.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let dir = store();
        let state = state_for(dir.path(), &[], "off");
        let req = get("/a%20b.txt")
            .body(Full::new(Bytes::from_static(b"0123456789")))
            .unwrap();

        let resp = handle_request(req, Arc::clone(&state), PEER).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let req = get("/a%20b.txt")
            .body(Full::new(Bytes::from_static(b"ok")))
            .unwrap();
        let resp = handle_request(req, state, PEER).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_encoded_path_and_not_found() {
        let dir = store();
        let state = state_for(dir.path(), &[], "off");

        let resp = send(&state, get("/a%20b.txt").body(Empty::new()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = send(&state, get("/missing").body(Empty::new()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");

        let resp = send(&state, get("/%FF").body(Empty::new()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_auth_gate() {
        let dir = store();
        let state = state_for(dir.path(), &["u,p"], "off");

        let resp = send(&state, get("/a%20b.txt").body(Empty::new()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let wrong = format!("Basic {}", STANDARD.encode("u:nope"));
        let resp = send(
            &state,
            get("/a%20b.txt")
                .header(AUTHORIZATION, wrong)
                .body(Empty::new())
                .unwrap(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let right = format!("Basic {}", STANDARD.encode("u:p"));
        let resp = send(
            &state,
            get("/a%20b.txt")
                .header(AUTHORIZATION, right)
                .body(Empty::new())
                .unwrap(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_listing_toggle() {
        let dir = store();

        let off = state_for(dir.path(), &[], "off");
        let resp = send(&off, get("/docs/").body(Empty::new()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = send(&off, get(STYLESHEET_PATH).body(Empty::new()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let on = state_for(dir.path(), &[], "darkslategray");
        let resp = send(&on, get("/docs/").body(Empty::new()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let etag = resp.headers()[ETAG].to_str().unwrap().to_string();

        let resp = send(
            &on,
            get("/docs/")
                .header(IF_NONE_MATCH, etag.as_str())
                .body(Empty::new())
                .unwrap(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(resp.headers()[ETAG], etag.as_str());

        let resp = send(&on, get(STYLESHEET_PATH).body(Empty::new()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let css = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&css).contains("background-color:darkslategray"));
    }
}
