use std::io;
use std::net::SocketAddrV4;

use thiserror::Error;

use crate::config::ConfigError;

/// Failures that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid server config: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("failed to create listening socket: {source}")]
    Socket { source: io::Error },

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddrV4, source: io::Error },

    #[error("failed to listen on {addr}: {source}")]
    Listen { addr: SocketAddrV4, source: io::Error },
}
