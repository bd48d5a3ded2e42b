//! Static resource HTTP server
//!
//! Serves GET and HEAD requests from one or more precedence-ordered
//! directories ("stores"), with byte ranges, conditional requests, optional
//! basic authentication, per-file header overrides and optional directory
//! listings.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod listing;
pub mod logger;
pub mod server;
pub mod store;
