//! HTTP protocol layer module
//!
//! Protocol-level building blocks shared by the handlers: range negotiation,
//! cache validation, content negotiation, MIME lookup, disposition headers,
//! the response body type and response builders. Nothing here touches the
//! filesystem layout or the server configuration.

pub mod body;
pub mod cache;
pub mod disposition;
pub mod mime;
pub mod negotiate;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::{FileWindow, ResponseBody};
pub use range::{negotiate as negotiate_range, RangeOutcome, RangeWindow};
pub use response::{
    build_401_response, build_403_response, build_404_response, build_405_response,
    build_413_response, build_416_response, build_response, HttpResponse,
};
