//! HTTP response serialization
//!
//! A response is written as a status line, the three managed headers
//! (`Content-Type`, `Content-Length`, `Connection`), the remaining headers and
//! cookies of the [`Response`], a blank line and the body.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{Response, SendError};

/// Initial buffer size reserved for the status line and headers
const INIT_HEADER_SIZE: usize = 512;

/// Headers whose values are derived from the response itself. Entries with
/// these names in the response header map are not written.
const MANAGED_HEADERS: [&str; 3] = ["content-type", "content-length", "connection"];

/// Serializes `response` into wire bytes.
///
/// `keep_alive` selects the `Connection` header value.
pub fn serialize_response(response: &Response, keep_alive: bool) -> BytesMut {
    let mut dst = BytesMut::new();
    write_response(response, keep_alive, &mut dst);
    dst
}

/// Encoder for `(Response, keep_alive)` pairs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<(Response, bool)> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (Response, bool), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (response, keep_alive) = item;
        write_response(&response, keep_alive, dst);
        Ok(())
    }
}

fn write_response(response: &Response, keep_alive: bool, dst: &mut BytesMut) {
    let body = response.body();
    dst.reserve(INIT_HEADER_SIZE + body.len());

    dst.put_slice(b"HTTP/1.1 ");
    dst.put_slice(response.status().as_str().as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(response.reason().as_bytes());
    dst.put_slice(b"\r\n");

    put_header(dst, "Content-Type", response.content_type());
    put_header(dst, "Content-Length", &body.len().to_string());
    put_header(dst, "Connection", if keep_alive { "keep-alive" } else { "close" });

    for (name, value) in response.headers() {
        if MANAGED_HEADERS.iter().any(|managed| name.eq_ignore_ascii_case(managed)) {
            continue;
        }
        put_header(dst, name, value);
    }

    for (name, value) in response.cookies() {
        dst.put_slice(b"Set-Cookie: ");
        dst.put_slice(name.as_bytes());
        dst.put_u8(b'=');
        dst.put_slice(value.as_bytes());
        dst.put_slice(b"\r\n");
    }

    dst.put_slice(b"\r\n");
    dst.put_slice(body);
}

fn put_header(dst: &mut BytesMut, name: &str, value: &str) {
    dst.put_slice(name.as_bytes());
    dst.put_slice(b": ");
    dst.put_slice(value.as_bytes());
    dst.put_slice(b"\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn serialize(response: &Response, keep_alive: bool) -> String {
        String::from_utf8(serialize_response(response, keep_alive).to_vec()).unwrap()
    }

    #[test]
    fn minimal_response() {
        let wire = serialize(&Response::new(), true);
        assert_eq!(
            wire,
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 0\r\nConnection: keep-alive\r\n\r\n"
        );
    }

    #[test]
    fn body_and_close() {
        let response = Response::from_status(StatusCode::NOT_FOUND).with_body("missing");
        let wire = serialize(&response, false);
        assert!(wire.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(wire.contains("\r\nContent-Length: 7\r\n"));
        assert!(wire.contains("\r\nConnection: close\r\n"));
        assert!(wire.ends_with("\r\n\r\nmissing"));
    }

    #[test]
    fn content_length_matches_body_bytes() {
        let response = Response::new().with_body("héllo");
        let wire = serialize(&response, true);
        assert!(wire.contains("\r\nContent-Length: 6\r\n"));
    }

    #[test]
    fn extra_headers_and_cookies_are_written() {
        let response = Response::new()
            .with_header("X-Request-Id", "42")
            .with_header("content-length", "999")
            .with_header("Connection", "upgrade")
            .with_cookie("session", "abc")
            .with_body("ok");
        let wire = serialize(&response, true);

        assert!(wire.contains("\r\nX-Request-Id: 42\r\n"));
        assert!(wire.contains("\r\nSet-Cookie: session=abc\r\n"));
        assert!(wire.contains("\r\nContent-Length: 2\r\n"));
        assert!(!wire.contains("999"));
        assert!(!wire.contains("upgrade"));
        assert_eq!(wire.matches("Connection:").count(), 1);
    }

    #[test]
    fn encoder_appends_to_buffer() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode((Response::new().with_body("a"), true), &mut dst).unwrap();
        encoder.encode((Response::new().with_body("b"), false), &mut dst).unwrap();

        let wire = String::from_utf8(dst.to_vec()).unwrap();
        assert_eq!(wire.matches("HTTP/1.1 200 OK").count(), 2);
        assert!(wire.ends_with("Connection: close\r\n\r\nb"));
    }
}
