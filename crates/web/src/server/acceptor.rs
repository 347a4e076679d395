use std::time::Duration;

use futures::FutureExt;
use tokio::net::TcpListener;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::server::worker_pool::{Accepted, WorkerPool};

/// Pause after a failed `accept`, so that a persistent error such as running
/// out of file descriptors does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts connections and hands them to `pool` until `shutdown` is cancelled.
///
/// Each wake-up accepts the ready connection and then every further connection
/// that can be accepted without waiting.
pub async fn accept_loop(listener: &TcpListener, pool: &WorkerPool, shutdown: &CancellationToken) {
    loop {
        let accepted = select! {
            biased;

            () = shutdown.cancelled() => {
                info!("shutdown requested, no longer accepting connections");
                return;
            }

            accepted = listener.accept() => accepted,
        };

        let mut next = Some(accepted);
        while let Some(accepted) = next {
            match accepted {
                Ok((stream, remote_addr)) => {
                    debug!(remote = %remote_addr, "accepted connection");
                    pool.submit(Accepted { stream, remote_addr });
                }
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    back_off(shutdown).await;
                    break;
                }
            }
            next = listener.accept().now_or_never();
        }
    }
}

/// Waits [`ACCEPT_BACKOFF`], or less if `shutdown` is cancelled meanwhile.
async fn back_off(shutdown: &CancellationToken) {
    select! {
        () = shutdown.cancelled() => {}
        () = tokio::time::sleep(ACCEPT_BACKOFF) => {}
    }
}
