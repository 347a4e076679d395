//! HTTP codec module for framing, parsing and serializing HTTP messages
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: finds message boundaries in a byte stream
//!   - [`parse_request`]: turns one complete message into a [`Request`](crate::protocol::Request)
//!   - [`url_decode`], [`decode_form`], [`parse_cookies`]: percent-decoding used
//!     for paths, query strings, form bodies and cookies
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: writes responses into an outgoing buffer
//!   - [`serialize_response`]: the same serialization as a plain function
//!
//! # Example
//!
//! ```
//! use sprig_http::codec::{parse_request, serialize_response};
//! use sprig_http::protocol::Response;
//! use bytes::Bytes;
//!
//! let request = parse_request(Bytes::from_static(b"GET /a?b=c HTTP/1.1\r\n\r\n"));
//! assert_eq!(request.query_param("b"), Some("c"));
//!
//! let wire = serialize_response(&Response::new().with_body("hi"), false);
//! assert!(wire.ends_with(b"\r\n\r\nhi"));
//! ```

mod request_decoder;
mod request_parser;
mod response_encoder;
mod urlencoded;

pub use request_decoder::DEFAULT_MAX_REQUEST_SIZE;
pub use request_decoder::RequestDecoder;
pub use request_parser::parse_request;
pub use response_encoder::ResponseEncoder;
pub use response_encoder::serialize_response;
pub use urlencoded::decode_form;
pub use urlencoded::parse_cookies;
pub use urlencoded::url_decode;
