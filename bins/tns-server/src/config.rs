use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "tns-server", about = "Topic name service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml", env = "TNS_CONFIG")]
    pub config: String,
}

// ---- TOML Config ----

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port. Accepts a number or a numeric string.
    #[serde(default = "default_port", alias = "Port", deserialize_with = "de_port")]
    pub port: u16,
    /// Store connection string: `memory://` or `file://<path>`.
    #[serde(default, alias = "Database")]
    pub database: DatabaseUrl,
    #[serde(default = "default_bind")]
    pub bind: IpAddr,
    /// Upper bound for a single store call.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

fn default_port() -> u16 {
    9200
}
fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}
fn default_query_timeout_ms() -> u64 {
    5000
}

fn de_port<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(n) => Ok(n),
        Port::Text(s) => s
            .trim()
            .trim_start_matches(':')
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid port '{s}': {e}"))),
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        Self::parse(&content)
            .map_err(|e| ServerError::Config { context: "parse", detail: format!("'{path}': {e}") })
    }

    pub fn parse(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

// ---- Database URL ----

/// Parsed `database` setting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum DatabaseUrl {
    #[default]
    Memory,
    File(PathBuf),
}

impl std::str::FromStr for DatabaseUrl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "memory" || s == "memory://" {
            return Ok(DatabaseUrl::Memory);
        }
        match s.strip_prefix("file://") {
            Some("") => Err(format!("database '{s}': file:// needs a path")),
            Some(path) => Ok(DatabaseUrl::File(PathBuf::from(path))),
            None => Err(format!("database '{s}': expected memory:// or file://<path>")),
        }
    }
}

impl TryFrom<String> for DatabaseUrl {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseUrl::Memory => f.write_str("memory://"),
            DatabaseUrl::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = ServerConfig::parse("").unwrap();
        assert_eq!(cfg.port, 9200);
        assert_eq!(cfg.database, DatabaseUrl::Memory);
        assert_eq!(cfg.listen_addr().to_string(), "0.0.0.0:9200");
        assert_eq!(cfg.query_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn capitalized_keys_and_string_port() {
        let cfg = ServerConfig::parse(
            r#"
            Port = "48323"
            Database = "file:///var/lib/tns/topics.json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.port, 48323);
        assert_eq!(cfg.database, DatabaseUrl::File(PathBuf::from("/var/lib/tns/topics.json")));
    }

    #[test]
    fn full_config() {
        let cfg = ServerConfig::parse(
            r#"
            port = 8080
            database = "memory://"
            bind = "127.0.0.1"
            query_timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(cfg.listen_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(cfg.query_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(ServerConfig::parse(r#"database = "mongodb://localhost""#).is_err());
        assert!(ServerConfig::parse(r#"database = "file://""#).is_err());
        assert!(ServerConfig::parse(r#"port = "http""#).is_err());
        assert!(ServerConfig::parse("port = 70000").is_err());
    }

    #[test]
    fn database_url_display_round_trips() {
        for s in ["memory://", "file://data/tns.json"] {
            let url: DatabaseUrl = s.parse().unwrap();
            assert_eq!(url.to_string(), s);
        }
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let err = ServerConfig::load(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ServerError::Config { context: "read", .. }));
    }
}
