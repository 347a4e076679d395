//! HTTP request framing
//!
//! Requests are not length-prefixed, so the decoder scans the accumulated
//! bytes for the blank line that ends the header section and then uses the
//! declared `Content-Length` to find the end of the body.
//!
//! # Example
//!
//! ```
//! use sprig_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /status HTTP/1.1\r\nHost: localhost\r\n\r\n");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.path(), "/status");
//! assert!(buffer.is_empty());
//! ```

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::request_parser::{declared_content_length, parse_request};
use crate::ensure;
use crate::protocol::{ParseError, Request};

/// Maximum number of bytes buffered for the header section, and the largest
/// body the decoder waits for.
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 16 * 1024;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// A decoder that splits one complete request at a time off a byte buffer.
///
/// - Without a complete header section it waits for more bytes, failing with
///   [`ParseError::TooLarge`] once the buffer reaches the size limit
/// - With a complete header section it waits until the declared body is
///   buffered, then yields the parsed [`Request`]
/// - A declared body larger than the limit is not waited for: the request is
///   yielded with the bytes at hand, so the router can reject it
#[derive(Debug, Clone, Copy)]
pub struct RequestDecoder {
    max_size: usize,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self { max_size: DEFAULT_MAX_REQUEST_SIZE }
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to split one request off the front of `src`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(_))`: a request was parsed and its bytes removed from `src`
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the header section exceeds the size limit
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(head_len) = find_header_end(src) else {
            ensure!(src.len() < self.max_size, ParseError::too_large(src.len(), self.max_size));
            return Ok(None);
        };

        let content_length = declared_content_length(&src[..head_len]);
        if content_length > self.max_size {
            trace!(content_length, max_size = self.max_size, "declared body exceeds limit, not waiting for it");
            let available = src.len();
            return Ok(Some(parse_request(src.split_to(available).freeze())));
        }

        let message_len = head_len + content_length;
        if src.len() < message_len {
            src.reserve(message_len - src.len());
            return Ok(None);
        }

        trace!(message_len, "framed request");
        Ok(Some(parse_request(src.split_to(message_len).freeze())))
    }

    /// Called when no more bytes will arrive (peer closed or read timed out);
    /// whatever is buffered is parsed as a best-effort request.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(request) = self.decode(src)? {
            return Ok(Some(request));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let available = src.len();
        Ok(Some(parse_request(src.split_to(available).freeze())))
    }
}

/// Returns the length of the header section including its terminator.
fn find_header_end(src: &[u8]) -> Option<usize> {
    src.windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
        .map(|pos| pos + HEADER_TERMINATOR.len())
}
