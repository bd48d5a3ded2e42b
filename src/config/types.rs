// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    /// Precedence-ordered store roots
    #[serde(default)]
    pub stores: Vec<PathBuf>,
    /// `user,password` entries
    #[serde(default)]
    pub credentials: Vec<String>,
    pub listing: ListingConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
    pub backlog: u32,
}

/// Directory listing configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ListingConfig {
    /// CSS colour for the listing background, or `off`
    pub color: String,
    /// Locale used when `Accept-Language` matches nothing
    #[serde(default)]
    pub default_locale: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    /// Seconds to wait for a request head on an open connection
    pub read_timeout: u64,
    /// Largest request body drained before answering
    pub max_body_size: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
}
