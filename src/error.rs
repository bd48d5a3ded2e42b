//! Error types
//!
//! `StartupError` covers everything that must stop the process before the
//! listener accepts a single connection. `ServeError` covers per-request
//! faults; the request handler always maps it to a status code.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration or bind failure
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("at least one --store is required")]
    NoStores,

    #[error("store '{}' is not usable: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store '{}' is not a directory", .0.display())]
    StoreNotDirectory(PathBuf),

    #[error("invalid credential entry '{0}': expected <user>,<password>")]
    Credential(String),

    #[error("invalid directory listing color '{0}'")]
    ListingColor(String),

    #[error("invalid listening address '{0}'")]
    Address(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to initialize logging: {0}")]
    Logging(#[source] io::Error),
}

/// Per-request fault, mapped to a response by the handler
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("request path is not valid UTF-8 or contains NUL")]
    InvalidPath,
}

impl ServeError {
    /// Whether the fault is worth an error-level log line
    pub fn is_unexpected(&self) -> bool {
        match self {
            Self::Io(err) => !matches!(
                err.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
            ),
            Self::InvalidPath => false,
        }
    }
}
