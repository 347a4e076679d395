//! Routing and serving on top of `sprig-http`.
//!
//! - [`Router`]: ordered method and pattern routes with `:param` and `*wildcard`
//!   captures, body decoding for `POST`/`PUT`, and a static file fallback
//! - [`RequestHandler`] and [`handler_fn`]: the handler seam for application code
//! - [`Server`]: binds a TCP listener and serves connections from a fixed worker pool
//! - [`ServerConfig`]: settings, loadable from a JSON file
//!
//! ```no_run
//! use sprig_web::{Router, Server, ServerConfig, handler_fn};
//! use sprig_http::protocol::Request;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn hello(request: Request) -> String {
//!     format!("Hello {}", request.form_field("name").unwrap_or("World"))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.post("/hello", handler_fn(hello));
//!
//!     let shutdown = CancellationToken::new();
//!     let server = Server::builder().router(router).config(ServerConfig::default()).bind()?;
//!     server.run(shutdown).await;
//!     Ok(())
//! }
//! ```

mod error;
mod handler;
mod static_files;

pub mod config;
pub mod extract;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use handler::FnHandler;
pub use handler::RequestHandler;
pub use handler::handler_fn;
pub use router::Router;
pub use server::Server;
pub use static_files::StaticFiles;
