//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Subscriber setup for diagnostics
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use std::error::Error as StdError;
use std::io;
use std::net::SocketAddr;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::config::{AppState, LoggingConfig};
use crate::error::StartupError;

/// Initialize diagnostics and the access log
///
/// Should be called once at application startup. `RUST_LOG`, when set,
/// overrides the configured level.
pub fn init(config: &LoggingConfig) -> Result<(), StartupError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();

    if config.access_log {
        writer::init(config.access_log_file.as_deref()).map_err(StartupError::Logging)?;
    }
    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, state: &AppState) {
    let config = &state.config;
    tracing::info!("======================================");
    tracing::info!("Static server started successfully");
    tracing::info!("Listening on: http://{addr}");
    for (i, store) in state.stores.iter().enumerate() {
        tracing::info!("Store #{}: {}", i + 1, store.root().display());
    }
    if !state.credentials.is_empty() {
        tracing::info!("Basic auth: {} user(s)", state.credentials.len());
    }
    if state.listing_enabled() {
        tracing::info!(
            "Directory listing: on ({}), default locale {}",
            config.listing.color,
            state.default_locale.tag
        );
    }
    tracing::info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.access_log_file {
        tracing::info!("Access log: {path}");
    }
    tracing::info!("======================================");
}

pub fn log_server_stop(active_connections: usize) {
    tracing::info!(active_connections, "Shutdown requested, no longer accepting connections");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

/// Log a failed connection; peer-side disconnects and timeouts stay at debug
pub fn log_connection_error(peer_addr: &SocketAddr, err: &hyper::Error) {
    if is_disconnect(err) {
        tracing::debug!("[Connection] {peer_addr} closed: {err}");
    } else {
        tracing::error!("[ERROR] Failed to serve connection from {peer_addr}: {err:?}");
    }
}

/// Whether a connection error is an ordinary disconnect rather than a fault
pub fn is_disconnect(err: &hyper::Error) -> bool {
    if err.is_incomplete_message() || err.is_canceled() || err.is_timeout() || err.is_closed() {
        return true;
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::TimedOut
            );
        }
        source = cause.source();
    }
    false
}

pub fn log_error(message: &str) {
    tracing::error!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("[WARN] {message}");
}

pub fn log_traversal_blocked(request_path: &str, resolved: &Path) {
    tracing::warn!(
        "[WARN] Path escapes its store: {request_path:?} resolved to {}",
        resolved.display()
    );
}

pub fn log_auth_rejected(user: Option<&str>) {
    match user {
        Some(user) => tracing::warn!("[WARN] Credentials rejected for user {user:?}"),
        None => tracing::warn!("[WARN] Malformed credentials rejected"),
    }
}

pub fn log_not_found(request_path: &str) {
    tracing::debug!("[404] {request_path}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    writer::write_access(&entry.format(format));
}
