//! Server configuration.
//!
//! Every option can come from a command-line flag or an `AUTHGATE_*`
//! environment variable; flags win.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Origins of the bundled web front-end during development.
pub const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:5174",
];

#[derive(Debug, Clone, Parser)]
#[command(name = "authgate", version, about = "Username/password login service with failed-attempt lockout")]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "AUTHGATE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// SQLite database file. Created and migrated on startup.
    #[arg(long, env = "AUTHGATE_DATABASE", default_value = "authgate.sqlite3")]
    pub database: PathBuf,

    /// trace|debug|info|warn|error. Defaults to debug in debug builds, info otherwise.
    #[arg(long, env = "AUTHGATE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files. Logs go to stderr when unset.
    #[arg(long, env = "AUTHGATE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Comma-separated browser origins allowed to call the API.
    #[arg(
        long,
        env = "AUTHGATE_CORS_ORIGINS",
        value_delimiter = ',',
        default_values = DEFAULT_CORS_ORIGINS
    )]
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or_else(|| authgate_core::default_log_level())
    }
}

#[cfg(test)]
mod tests {
    use super::{ServerConfig, DEFAULT_CORS_ORIGINS};
    use clap::Parser;

    #[test]
    fn defaults_apply_without_flags() {
        let config = ServerConfig::try_parse_from(["authgate"]).unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(config.database.to_str(), Some("authgate.sqlite3"));
        assert_eq!(config.cors_origins, DEFAULT_CORS_ORIGINS.to_vec());
        assert_eq!(config.log_level(), authgate_core::default_log_level());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "authgate",
            "--bind",
            "0.0.0.0:9000",
            "--log-level",
            "warn",
            "--cors-origins",
            "https://a.example,https://b.example",
        ])
        .unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.log_level(), "warn");
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn rejects_malformed_bind_address() {
        assert!(ServerConfig::try_parse_from(["authgate", "--bind", "localhost"]).is_err());
    }
}
