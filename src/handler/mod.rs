//! Request handler module
//!
//! Responsible for request dispatch and response composition: files,
//! directory listings and the listing stylesheet.

pub mod directory;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
