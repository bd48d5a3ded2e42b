//! HTTP response building module
//!
//! Builders for the fixed-shape responses (errors, auth challenges) plus the
//! header helpers the composer uses. Error responses carry no body.

use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CONNECTION,
    CONTENT_RANGE, SERVER, WWW_AUTHENTICATE, X_CONTENT_TYPE_OPTIONS,
};
use hyper::{Response, StatusCode};

use super::body::ResponseBody;
use super::range::RangeOutcome;
use crate::logger;

pub type HttpResponse = Response<ResponseBody>;

/// Methods with a registered handler, as advertised in `Allow`
pub const ALLOWED_METHODS: &str = "GET, HEAD";

/// Assemble a response from already-computed parts
pub fn build_response(status: StatusCode, headers: HeaderMap, body: ResponseBody) -> HttpResponse {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Response with a status and no headers or body
pub fn build_empty_response(status: StatusCode) -> HttpResponse {
    build_response(status, HeaderMap::new(), ResponseBody::empty())
}

/// Build 404 Not Found response
pub fn build_404_response() -> HttpResponse {
    build_empty_response(StatusCode::NOT_FOUND)
}

/// Build 401 Unauthorized response with a Basic challenge
pub fn build_401_response(realm: &str) -> HttpResponse {
    challenge_response(StatusCode::UNAUTHORIZED, realm)
}

/// Build 403 Forbidden response for rejected credentials
pub fn build_403_response(realm: &str) -> HttpResponse {
    challenge_response(StatusCode::FORBIDDEN, realm)
}

fn challenge_response(status: StatusCode, realm: &str) -> HttpResponse {
    let mut headers = HeaderMap::new();
    insert_header(
        &mut headers,
        WWW_AUTHENTICATE,
        &format!("Basic realm=\"{realm}\", charset=\"UTF-8\""),
    );
    build_response(status, headers, ResponseBody::empty())
}

/// Build 405 Method Not Allowed response; the connection is closed after it
pub fn build_405_response() -> HttpResponse {
    let mut headers = HeaderMap::new();
    headers.insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    build_response(StatusCode::METHOD_NOT_ALLOWED, headers, ResponseBody::empty())
}

/// Build 413 Payload Too Large response; the connection is closed after it
pub fn build_413_response() -> HttpResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    build_response(StatusCode::PAYLOAD_TOO_LARGE, headers, ResponseBody::empty())
}

/// Build 416 Range Not Satisfiable response on top of computed headers
pub fn build_416_response(mut headers: HeaderMap, total_size: u64) -> HttpResponse {
    insert_header(
        &mut headers,
        CONTENT_RANGE,
        &RangeOutcome::unsatisfied_range(total_size),
    );
    build_response(StatusCode::RANGE_NOT_SATISFIABLE, headers, ResponseBody::empty())
}

/// Insert a header, dropping values that are not valid header text
pub fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(e) => {
            logger::log_warning(&format!("Dropping invalid {name} header value {value:?}: {e}"));
        }
    }
}

/// Server-wide policy headers added to every response
pub fn apply_policy_headers(headers: &mut HeaderMap, server_name: &str, enable_cors: bool) {
    if !server_name.is_empty() && !headers.contains_key(SERVER) {
        insert_header(headers, SERVER, server_name);
    }
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    if enable_cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
}
