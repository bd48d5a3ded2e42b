// Configuration module entry point
// Loads layered configuration and validates it into the shared state

mod cli;
mod state;
mod types;

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use crate::error::StartupError;

// Re-export public types
pub use cli::Cli;
pub use state::AppState;
pub use types::{
    Config, HttpConfig, ListingConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Configuration file looked up in the working directory when `--config` is absent
const DEFAULT_CONFIG_NAME: &str = "static_server";

/// Environment prefix, e.g. `STATIC_SERVER_SERVER__PORT=8080`
const ENV_PREFIX: &str = "STATIC_SERVER";

impl Config {
    /// Load defaults, the configuration file and the environment, then apply CLI flags
    pub fn load(cli: &Cli) -> Result<Self, StartupError> {
        let mut config = Self::load_from(cli.config.as_deref())?;
        cli.apply(&mut config);
        Ok(config)
    }

    /// Load without CLI flags; an explicit `path` must exist
    pub fn load_from(path: Option<&Path>) -> Result<Self, StartupError> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = config::Config::builder()
            .set_default("server.ip", "0.0.0.0")?
            .set_default("server.port", 443)?
            .set_default("server.backlog", 1024)?
            .set_default("listing.color", "off")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.max_body_size", 1_048_576)? // 1MB
            .set_default("http.server_name", "static_microserver")?
            .set_default("http.enable_cors", false)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(";")
                    .with_list_parse_key("stores")
                    .with_list_parse_key("credentials")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let ip: IpAddr = self
            .server
            .ip
            .trim_matches(|c| c == '[' || c == ']')
            .parse()
            .map_err(|_| StartupError::Address(self.server.ip.clone()))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.server.ip, "0.0.0.0");
        assert_eq!(config.server.port, 443);
        assert_eq!(config.server.backlog, 1024);
        assert_eq!(config.listing.color, "off");
        assert_eq!(config.logging.access_log_format, "combined");
        assert_eq!(config.performance.read_timeout, 30);
        assert!(config.stores.is_empty());
        assert!(config.credentials.is_empty());
    }

    #[test]
    fn test_file_then_cli() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(
            &path,
            r#"
stores = ["/srv/file"]
credentials = ["alice,secret"]

[server]
port = 8080

[listing]
color = "navy"
"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "static_microserver",
            "--config",
            path.to_str().unwrap(),
            "--store",
            "/srv/cli",
            "--get_credential",
            "bob,pw",
            "--ip",
            "127.0.0.1",
        ])
        .unwrap();

        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.ip, "127.0.0.1");
        assert_eq!(config.listing.color, "navy");
        assert_eq!(config.stores, [std::path::PathBuf::from("/srv/cli")]);
        assert_eq!(config.credentials, ["alice,secret", "bob,pw"]);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(StartupError::Config(_))));
    }

    #[test]
    fn test_socket_addr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.toml");
        std::fs::write(&path, "[server]\nip = \"::1\"\nport = 8443\n").unwrap();
        let mut config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "[::1]:8443");

        config.server.ip = "not an ip".to_string();
        assert!(matches!(config.socket_addr(), Err(StartupError::Address(_))));
    }
}
