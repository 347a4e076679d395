//! Core HTTP protocol types shared by the codec, the connection and the router.
//!
//! - **Request** ([`request`]): [`Request`] is one parsed inbound message, including
//!   the maps the router fills in (route parameters, form fields, JSON body)
//! - **Response** ([`response`]): [`Response`] is one outbound message built by
//!   chaining `with_*` calls; its content length always tracks its body
//! - **Error Handling** ([`error`]): [`HttpError`], [`ParseError`], [`SendError`]

mod request;
pub use request::Request;

mod response;
pub use response::DEFAULT_CONTENT_TYPE;
pub use response::Response;
pub use response::coerce_status;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
