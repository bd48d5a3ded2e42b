// Command-line surface
// Flags win over the configuration file and the environment

use std::path::PathBuf;

use clap::Parser;

use super::types::Config;

/// Serve static files from one or more directories
#[derive(Debug, Default, Parser)]
#[command(name = "static_microserver", version, about)]
pub struct Cli {
    /// Address to listen on
    #[arg(long)]
    pub ip: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory to serve; repeat for more, earlier ones take precedence
    #[arg(long = "store", value_name = "PATH")]
    pub stores: Vec<PathBuf>,

    /// Require basic auth; repeat for more users
    #[arg(long = "get_credential", value_name = "USER,PASSWORD")]
    pub credentials: Vec<String>,

    /// Enable directory listings with this background colour
    #[arg(long = "directory_listing_color", value_name = "CSS_COLOR|off")]
    pub listing_color: Option<String>,

    /// Configuration file (toml, yaml or json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive
    #[arg(long = "log_level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Runtime worker threads
    #[arg(long)]
    pub workers: Option<usize>,
}

impl Cli {
    /// Overlay the flags that were given onto a loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(ip) = &self.ip {
            config.server.ip.clone_from(ip);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(workers) = self.workers {
            config.server.workers = Some(workers);
        }
        if !self.stores.is_empty() {
            config.stores.clone_from(&self.stores);
        }
        config.credentials.extend(self.credentials.iter().cloned());
        if let Some(color) = &self.listing_color {
            config.listing.color.clone_from(color);
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeatable_flags() {
        let cli = Cli::try_parse_from([
            "static_microserver",
            "--store",
            "/srv/a",
            "--store",
            "/srv/b",
            "--get_credential",
            "u,p",
            "--get_credential",
            "admin,a,b",
            "--directory_listing_color",
            "#336699",
            "--port",
            "8080",
        ])
        .unwrap();

        assert_eq!(cli.stores, [PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]);
        assert_eq!(cli.credentials, ["u,p", "admin,a,b"]);
        assert_eq!(cli.listing_color.as_deref(), Some("#336699"));
        assert_eq!(cli.port, Some(8080));
        assert!(cli.ip.is_none());
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Cli::try_parse_from(["static_microserver", "--port", "99999"]).is_err());
    }
}
