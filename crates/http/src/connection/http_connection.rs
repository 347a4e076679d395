use std::net::SocketAddr;
use std::time::Duration;

use bytes::BytesMut;
use futures::SinkExt;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::select;
use tokio::time::timeout;
use tokio_util::codec::{Decoder, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::codec::{DEFAULT_MAX_REQUEST_SIZE, RequestDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, Request, Response, SendError};

/// Size of a single read from the socket
pub const READ_CHUNK_SIZE: usize = 1024;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeouts and limits applied to every message on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// How long to wait for the first byte of a message.
    pub idle_timeout: Duration,
    /// How long to wait for each further read once a message has started.
    pub read_timeout: Duration,
    /// How long writing one response may take.
    pub write_timeout: Duration,
    /// Limit on the header section and on the body the decoder waits for.
    pub max_request_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
        }
    }
}

/// What a read phase produced.
enum Inbound {
    /// A fully framed message.
    Complete(Request),
    /// The peer stopped sending (timeout or close) in the middle of a message.
    Partial(Request),
    /// Nothing arrived, or the server is shutting down.
    Closed,
}

/// An HTTP connection that reads requests, hands them to a [`Handler`] and
/// writes the responses back, one message at a time.
///
/// Each round trip goes through reading, dispatching and writing. The
/// connection is kept open for another round unless the client sent
/// `Connection: close`, the message was cut short, a write failed, or
/// shutdown was requested.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
///
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    reader: R,
    read_buf: BytesMut,
    decoder: RequestDecoder,
    framed_write: FramedWrite<W, ResponseEncoder>,
    config: ConnectionConfig,
    remote_addr: Option<SocketAddr>,
    shutdown: CancellationToken,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: ConnectionConfig) -> Self {
        Self {
            reader,
            read_buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
            decoder: RequestDecoder::with_max_size(config.max_request_size),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
            config,
            remote_addr: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Records the peer address, copied into every request read from this connection.
    #[must_use]
    pub fn remote_addr(mut self, remote_addr: SocketAddr) -> Self {
        self.remote_addr = Some(remote_addr);
        self
    }

    /// Once `shutdown` is cancelled the connection finishes the message in
    /// flight and then closes instead of waiting for another one.
    #[must_use]
    pub fn shutdown_token(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub async fn process<H>(mut self, handler: &H) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        loop {
            let (mut request, complete) = match self.read_request().await {
                Ok(Inbound::Complete(request)) => (request, true),
                Ok(Inbound::Partial(request)) => (request, false),
                Ok(Inbound::Closed) => {
                    trace!("no more requests, closing connection");
                    return Ok(());
                }
                Err(ParseError::TooLarge { current_size, max_size }) => {
                    warn!(current_size, max_size, "request exceeds size limit, closing connection");
                    self.send_response(Response::from_status(StatusCode::PAYLOAD_TOO_LARGE), false).await?;
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            // a body shorter than declared leaves unread bytes on the stream
            let truncated = request.body().len() < request.content_length();
            let mut keep_alive = complete && !truncated && !request.wants_close();

            if let Some(remote_addr) = self.remote_addr {
                request.set_remote_addr(remote_addr);
            }

            let method = request.method().to_owned();
            let path = request.path().to_owned();
            let response = handler.call(request).await;
            debug!(%method, %path, status = response.status().as_u16(), keep_alive, "handled request");

            keep_alive &= !self.shutdown.is_cancelled();
            self.send_response(response, keep_alive).await?;

            if !keep_alive {
                return Ok(());
            }
        }
    }

    async fn read_request(&mut self) -> Result<Inbound, ParseError> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            if let Some(request) = self.decoder.decode(&mut self.read_buf)? {
                return Ok(Inbound::Complete(request));
            }

            let idle = self.read_buf.is_empty();
            let wait = if idle { self.config.idle_timeout } else { self.config.read_timeout };

            let read = select! {
                biased;

                () = self.shutdown.cancelled(), if idle => {
                    debug!("shutdown requested, closing idle connection");
                    return Ok(Inbound::Closed);
                }

                read = timeout(wait, self.reader.read(&mut chunk)) => read,
            };

            match read {
                Ok(Ok(0)) => {
                    trace!(buffered = self.read_buf.len(), "peer closed the stream");
                    return self.finish_partial();
                }
                Ok(Ok(n)) => {
                    trace!(read = n, "read from stream");
                    self.read_buf.extend_from_slice(&chunk[..n]);
                }
                Ok(Err(e)) => return Err(ParseError::io(e)),
                Err(_) => {
                    debug!(?wait, buffered = self.read_buf.len(), "read timed out");
                    return self.finish_partial();
                }
            }
        }
    }

    fn finish_partial(&mut self) -> Result<Inbound, ParseError> {
        match self.decoder.decode_eof(&mut self.read_buf)? {
            Some(request) => Ok(Inbound::Partial(request)),
            None => Ok(Inbound::Closed),
        }
    }

    async fn send_response(&mut self, response: Response, keep_alive: bool) -> Result<(), SendError> {
        let wait = self.config.write_timeout;
        match timeout(wait, self.framed_write.send((response, keep_alive))).await {
            Ok(result) => result,
            Err(_) => Err(SendError::Timeout(wait)),
        }
    }
}
