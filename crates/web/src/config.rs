//! Server settings, loaded from a JSON file such as:
//!
//! ```json
//! { "host": "127.0.0.1", "port": 8080, "workers": 4, "public_dir": "public" }
//! ```
//!
//! Every field is optional and falls back to its default.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sprig_http::codec::DEFAULT_MAX_REQUEST_SIZE;
use sprig_http::connection::ConnectionConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IPv4 address to bind.
    pub host: String,
    pub port: u16,
    /// Number of connection workers.
    pub workers: usize,
    /// Directory served for unmatched `GET` requests.
    pub public_dir: Option<PathBuf>,
    pub idle_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    /// How long shutdown waits for busy workers before aborting them.
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::LOCALHOST.to_string(),
            port: 8080,
            workers: 4,
            public_dir: None,
            idle_timeout_secs: 5,
            read_timeout_secs: 5,
            write_timeout_secs: 5,
            shutdown_grace_secs: 5,
        }
    }
}

impl ServerConfig {
    /// Reads and validates a JSON config file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_owned(), source })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path: path.to_owned(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        self.host
            .parse::<Ipv4Addr>()
            .map_err(|e| ConfigError::Invalid(format!("host '{}' is not an IPv4 address: {e}", self.host)))?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddrV4, ConfigError> {
        self.validate()?;
        let ip = self.host.parse::<Ipv4Addr>().map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(SocketAddrV4::new(ip, self.port))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// The per-connection timeouts and limits derived from these settings.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            write_timeout: Duration::from_secs(self.write_timeout_secs),
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
        }
    }
}
