//! HTTP connection handling module
//!
//! [`HttpConnection`] drives a single client connection: it reads bytes
//! until a request is framed, passes the request to a
//! [`Handler`](crate::handler::Handler), writes the response and decides
//! whether to wait for another request.
//!
//! # Features
//!
//! - Keep-alive by default, closed on `Connection: close`
//! - Separate idle, read and write timeouts ([`ConnectionConfig`])
//! - Best-effort handling of requests cut short by a timeout or a closed peer
//! - Cooperative shutdown through a cancellation token

mod http_connection;

pub use http_connection::ConnectionConfig;
pub use http_connection::HttpConnection;
pub use http_connection::READ_CHUNK_SIZE;
