//! The listening side of the server: binding, accepting and the worker pool.
//!
//! ```no_run
//! use sprig_web::{Router, Server, ServerConfig, handler_fn};
//! use sprig_http::protocol::Request;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.get("/status", handler_fn(|_request: Request| async { "up" }));
//!
//!     let server = Server::builder().router(router).config(ServerConfig::default()).bind()?;
//!     server.run(CancellationToken::new()).await;
//!     Ok(())
//! }
//! ```

mod acceptor;
mod queue;
mod worker_pool;

pub use queue::WorkQueue;
pub use worker_pool::{Accepted, Job, WorkerPool};

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpSocket};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::router::Router;

/// Pending connections the OS queues before `accept`.
pub const LISTEN_BACKLOG: u32 = 20;

#[derive(Debug, Default)]
pub struct ServerBuilder {
    router: Option<Router>,
    config: ServerConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listening socket. Must be called within a tokio runtime.
    ///
    /// A router without a static directory picks up `public_dir` from the config.
    pub fn bind(self) -> Result<Server, ServerError> {
        let addr = self.config.socket_addr()?;

        let mut router = self.router.unwrap_or_default();
        if let Some(public_dir) = &self.config.public_dir
            && !router.has_public_dir()
        {
            router.set_public_dir(public_dir);
        }

        let socket = TcpSocket::new_v4().map_err(|source| ServerError::Socket { source })?;
        socket.set_reuseaddr(true).map_err(|source| ServerError::Socket { source })?;
        socket.bind(addr.into()).map_err(|source| ServerError::Bind { addr, source })?;
        let listener = socket.listen(LISTEN_BACKLOG).map_err(|source| ServerError::Listen { addr, source })?;

        Ok(Server { listener, router: Arc::new(router), config: self.config })
    }
}

/// A bound server, ready to [`run`](Server::run).
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    config: ServerConfig,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves connections until `shutdown` is cancelled, then stops the
    /// workers and closes the listening socket.
    pub async fn run(self, shutdown: CancellationToken) {
        match self.listener.local_addr() {
            Ok(addr) => info!(%addr, workers = self.config.workers, "start listening"),
            Err(e) => info!(cause = %e, "start listening on unknown address"),
        }

        let pool = WorkerPool::spawn(
            self.config.workers,
            Arc::clone(&self.router),
            self.config.connection_config(),
            shutdown.clone(),
        );

        acceptor::accept_loop(&self.listener, &pool, &shutdown).await;

        pool.shutdown(self.config.shutdown_grace()).await;
        drop(self.listener);
        info!("server stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use serde_json::json;
    use sprig_http::protocol::{Request, Response};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    async fn hello(request: Request) -> String {
        format!("Hello {}", request.form_field("name").unwrap_or("World"))
    }

    fn config() -> ServerConfig {
        ServerConfig { port: 0, workers: 2, shutdown_grace_secs: 1, ..ServerConfig::default() }
    }

    async fn echo_json(request: Request) -> serde_json::Value {
        request.json().cloned().unwrap_or_default()
    }

    async fn user(request: Request) -> Response {
        let id = request.param("id").unwrap_or_default();
        let rest = request.param("rest").unwrap_or_default();
        Response::new().with_body(format!("{id} {rest}"))
    }

    fn start() -> (SocketAddr, CancellationToken, JoinHandle<()>) {
        let mut router = Router::new();
        router
            .post("/hello", handler_fn(hello))
            .post("/json", handler_fn(echo_json))
            .get("/users/:id/*rest", handler_fn(user));

        let server = Server::builder().router(router).config(config()).bind().unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(server.run(shutdown.clone()));
        (addr, shutdown, handle)
    }

    /// Reads one response off a keep-alive connection.
    async fn read_response(stream: &mut TcpStream) -> (String, String) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 512];
        loop {
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8(buf[..end].to_vec()).unwrap();
                let length: usize = head
                    .lines()
                    .find_map(|line| line.strip_prefix("Content-Length: "))
                    .map(|v| v.parse().unwrap())
                    .unwrap();
                if buf.len() >= end + 4 + length {
                    let body = String::from_utf8(buf[end + 4..end + 4 + length].to_vec()).unwrap();
                    return (head, body);
                }
            }
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed early");
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    #[tokio::test]
    async fn serves_keep_alive_requests() {
        let (addr, shutdown, handle) = start();
        let mut stream = TcpStream::connect(addr).await.unwrap();

        stream
            .write_all(b"POST /hello HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 8\r\n\r\nname=Ada")
            .await
            .unwrap();
        let (head, body) = read_response(&mut stream).await;
        assert!(head.starts_with("HTTP/1.1 200 OK"));
        assert!(head.contains("Connection: keep-alive"));
        assert_eq!(body, "Hello Ada");

        let payload = r#"{"list":[1,2,3]}"#;
        let request = format!(
            "POST /json HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{payload}",
            payload.len()
        );
        stream.write_all(request.as_bytes()).await.unwrap();
        let (head, body) = read_response(&mut stream).await;
        assert!(head.contains("Content-Type: application/json"));
        assert_eq!(serde_json::from_str::<serde_json::Value>(&body).unwrap(), json!({"list": [1, 2, 3]}));

        stream.write_all(b"GET /users/42/a/b HTTP/1.1\r\n\r\n").await.unwrap();
        let (_, body) = read_response(&mut stream).await;
        assert_eq!(body, "42 a/b");

        stream.write_all(b"GET /nowhere HTTP/1.1\r\nConnection: close\r\n\r\n").await.unwrap();
        let (head, _) = read_response(&mut stream).await;
        assert!(head.starts_with("HTTP/1.1 404 Not Found"));
        assert!(head.contains("Connection: close"));

        shutdown.cancel();
        timeout(Duration::from_secs(3), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn serves_more_clients_than_workers() {
        let (addr, shutdown, handle) = start();

        let mut clients = Vec::new();
        for _ in 0..4 {
            clients.push(TcpStream::connect(addr).await.unwrap());
        }
        for (i, client) in clients.iter_mut().enumerate() {
            let request = format!("GET /users/{i}/x HTTP/1.1\r\nConnection: close\r\n\r\n");
            client.write_all(request.as_bytes()).await.unwrap();
        }

        for (i, client) in clients.iter_mut().enumerate() {
            let (head, body) = timeout(Duration::from_secs(3), read_response(client)).await.unwrap();
            assert!(head.starts_with("HTTP/1.1 200 OK"));
            assert_eq!(body, format!("{i} x"));
        }

        shutdown.cancel();
        timeout(Duration::from_secs(3), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn shutdown_closes_idle_connections() {
        let (addr, shutdown, handle) = start();
        let mut stream = TcpStream::connect(addr).await.unwrap();

        stream.write_all(b"GET /users/1/x HTTP/1.1\r\n\r\n").await.unwrap();
        let (head, _) = read_response(&mut stream).await;
        assert!(head.contains("Connection: keep-alive"));

        shutdown.cancel();
        timeout(Duration::from_secs(3), handle).await.unwrap().unwrap();

        let mut rest = Vec::new();
        let n = timeout(Duration::from_secs(1), stream.read_to_end(&mut rest)).await.unwrap().unwrap();
        assert_eq!(n, 0);
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn oversized_body_gets_413() {
        let (addr, shutdown, handle) = start();
        let mut stream = TcpStream::connect(addr).await.unwrap();

        stream.write_all(b"POST /json HTTP/1.1\r\nContent-Length: 20000\r\n\r\n{}").await.unwrap();
        let (head, _) = read_response(&mut stream).await;
        assert!(head.starts_with("HTTP/1.1 413 Payload Too Large"));
        assert!(head.contains("Connection: close"));

        shutdown.cancel();
        timeout(Duration::from_secs(3), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn bind_rejects_invalid_config() {
        let no_workers = ServerConfig { workers: 0, ..config() };
        assert!(matches!(Server::builder().config(no_workers).bind(), Err(ServerError::Config { .. })));

        let ipv6 = ServerConfig { host: "::1".into(), ..config() };
        assert!(matches!(Server::builder().config(ipv6).bind(), Err(ServerError::Config { .. })));
    }
}
