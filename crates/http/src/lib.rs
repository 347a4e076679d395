//! An asynchronous HTTP/1.1 server engine
//!
//! This crate contains the protocol half of the server: framing and lenient
//! parsing of requests, serialization of responses, and the per-connection
//! loop that ties them to a request handler. Routing, static files and the
//! listener live in `sprig-web`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//! use sprig_http::connection::HttpConnection;
//! use sprig_http::handler::make_handler;
//! use sprig_http::protocol::{Request, Response};
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     info!(port = 8080, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer).remote_addr(remote_addr);
//!             if let Err(e) = connection.process(handler.as_ref()).await {
//!                 error!("connection failed, cause {}", e);
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request) -> Response {
//!     info!(path = request.path(), "receiving request");
//!     Response::new().with_body("Hello World!\r\n")
//! }
//! ```
//!
//! # Architecture
//!
//! - [`connection`]: the read, dispatch, write loop of one connection
//! - [`protocol`]: [`Request`](protocol::Request), [`Response`](protocol::Response) and the error types
//! - [`codec`]: request framing and parsing, response serialization
//! - [`handler`]: the [`Handler`](handler::Handler) trait and [`make_handler`](handler::make_handler)
//!
//! # Error Handling
//!
//! Malformed input never produces an error: the parser fills in what it can
//! and leaves the rest empty. Errors are reserved for the transport:
//!
//! - [`protocol::HttpError`]: Top-level error type
//! - [`protocol::ParseError`]: oversized requests and read failures
//! - [`protocol::SendError`]: write failures and write timeouts
//!
//! # Limitations
//!
//! - HTTP/1.1 only, one request at a time per connection (no pipelining)
//! - No chunked transfer encoding, bodies are framed by `Content-Length`
//! - No TLS support (use a reverse proxy for HTTPS)
//! - Maximum request size: 16KB by default

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
