use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use sprig_http::connection::{ConnectionConfig, HttpConnection};
use sprig_http::handler::Handler;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::server::queue::WorkQueue;

/// An accepted socket on its way to a worker.
#[derive(Debug)]
pub struct Accepted {
    pub stream: TcpStream,
    pub remote_addr: SocketAddr,
}

#[derive(Debug)]
pub enum Job {
    Connection(Accepted),
    /// Tells the worker that pops it to exit.
    Stop,
}

/// A fixed set of tasks that serve the connections pushed onto a shared queue.
#[derive(Debug)]
pub struct WorkerPool {
    queue: WorkQueue<Job>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` workers, each serving one connection at a time with `handler`.
    ///
    /// `shutdown` is handed to every connection so that keep-alive stops once
    /// the server is shutting down.
    pub fn spawn<H>(size: usize, handler: Arc<H>, config: ConnectionConfig, shutdown: CancellationToken) -> Self
    where
        H: Handler + 'static,
    {
        let queue = WorkQueue::new();
        let workers = (0..size)
            .map(|worker_id| {
                let queue = queue.clone();
                let handler = Arc::clone(&handler);
                let shutdown = shutdown.clone();
                tokio::spawn(async move { run_worker(worker_id, &queue, handler.as_ref(), config, &shutdown).await })
            })
            .collect();

        info!(workers = size, "worker pool started");
        Self { queue, workers }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Hands `accepted` to the next idle worker.
    pub fn submit(&self, accepted: Accepted) {
        self.queue.push(Job::Connection(accepted));
    }

    /// Stops every worker and waits for them to finish.
    ///
    /// One [`Job::Stop`] per worker is queued behind any pending connections.
    /// Workers still running after `grace` are aborted.
    pub async fn shutdown(self, grace: Duration) {
        for _ in 0..self.workers.len() {
            self.queue.push(Job::Stop);
        }

        let abort_handles = self.workers.iter().map(JoinHandle::abort_handle).collect::<Vec<_>>();
        match timeout(grace, join_all(self.workers)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        error!(cause = %e, "worker terminated abnormally");
                    }
                }
                info!("worker pool stopped");
            }
            Err(_) => {
                warn!(?grace, "workers still busy after grace period, aborting");
                for handle in abort_handles {
                    handle.abort();
                }
            }
        }
    }
}

async fn run_worker<H>(
    worker_id: usize,
    queue: &WorkQueue<Job>,
    handler: &H,
    config: ConnectionConfig,
    shutdown: &CancellationToken,
) where
    H: Handler + ?Sized,
{
    debug!(worker_id, "worker started");

    while let Some(Job::Connection(Accepted { stream, remote_addr })) = queue.pop().await {
        debug!(worker_id, remote = %remote_addr, "serving connection");

        let (reader, writer) = stream.into_split();
        let connection = HttpConnection::with_config(reader, writer, config)
            .remote_addr(remote_addr)
            .shutdown_token(shutdown.clone());

        match AssertUnwindSafe(connection.process(handler)).catch_unwind().await {
            Ok(Ok(())) => debug!(worker_id, remote = %remote_addr, "connection closed"),
            Ok(Err(e)) => error!(worker_id, remote = %remote_addr, cause = %e, "connection failed"),
            Err(panic) => error!(worker_id, remote = %remote_addr, panic = ?panic, "connection handler panicked"),
        }
    }

    debug!(worker_id, "worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sprig_http::protocol::{Request, Response};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    struct Panicking;

    #[async_trait]
    impl Handler for Panicking {
        async fn call(&self, request: Request) -> Response {
            if request.path() == "/panic" {
                panic!("handler exploded");
            }
            Response::new().with_body("fine")
        }
    }

    async fn connect(listener: &TcpListener, pool: &WorkerPool) -> TcpStream {
        let client = TcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
        let (stream, remote_addr) = listener.accept().await.unwrap();
        pool.submit(Accepted { stream, remote_addr });
        client
    }

    async fn exchange(client: &mut TcpStream, path: &str) -> String {
        client.write_all(format!("GET {path} HTTP/1.1\r\nConnection: close\r\n\r\n").as_bytes()).await.unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn worker_survives_a_panicking_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let pool = WorkerPool::spawn(1, Arc::new(Panicking), ConnectionConfig::default(), CancellationToken::new());

        let mut first = connect(&listener, &pool).await;
        let response = exchange(&mut first, "/panic").await;
        assert!(response.is_empty());

        let mut second = connect(&listener, &pool).await;
        let response = exchange(&mut second, "/ok").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("fine"));

        timeout(Duration::from_secs(2), pool.shutdown(Duration::from_secs(1))).await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_stops_idle_workers() {
        let pool = WorkerPool::spawn(3, Arc::new(Panicking), ConnectionConfig::default(), CancellationToken::new());
        assert_eq!(pool.size(), 3);
        timeout(Duration::from_secs(2), pool.shutdown(Duration::from_secs(1))).await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_aborts_after_grace() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ConnectionConfig { idle_timeout: Duration::from_secs(60), ..ConnectionConfig::default() };
        // the token is never cancelled, so the idle connection holds its worker
        let pool = WorkerPool::spawn(1, Arc::new(Panicking), config, CancellationToken::new());

        let _client = connect(&listener, &pool).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        timeout(Duration::from_secs(2), pool.shutdown(Duration::from_millis(100))).await.unwrap();
    }
}
