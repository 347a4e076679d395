//! The structured form of one outbound HTTP message.
//!
//! Responses are built by chaining `with_*` calls on [`Response::new`]; the body
//! setters keep the content length in sync with the body bytes, so the
//! serialized `Content-Length` can never disagree with what is written.

use std::collections::HashMap;

use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;

/// The content type used when a handler does not set one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    body: Bytes,
    content_type: String,
    content_length: usize,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            body: Bytes::new(),
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
            content_length: 0,
        }
    }
}

impl Response {
    /// A `200 OK` response with an empty `text/html` body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for an empty response with the given status.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new().with_status(status)
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets the status from a raw code; codes that are not a recognized HTTP
    /// status are replaced by `500 Internal Server Error`.
    #[must_use]
    pub fn with_status_code(self, code: u16) -> Self {
        self.with_status(coerce_status(code))
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self.content_length = self.body.len();
        self
    }

    /// Serializes `value` as the body and sets the content type to `application/json`.
    #[must_use]
    pub fn with_json(self, value: &Value) -> Self {
        self.with_content_type(mime::APPLICATION_JSON.as_ref()).with_body(value.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The reason phrase derived from the status, e.g. `Not Found`.
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }
}

/// Maps a raw status code to a recognized [`StatusCode`], falling back to
/// `500 Internal Server Error`.
pub fn coerce_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code)
        .ok()
        .filter(|status| status.canonical_reason().is_some())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl From<StatusCode> for Response {
    fn from(status: StatusCode) -> Self {
        Self::from_status(status)
    }
}

impl From<&'static str> for Response {
    fn from(body: &'static str) -> Self {
        Self::new().with_body(body)
    }
}

impl From<String> for Response {
    fn from(body: String) -> Self {
        Self::new().with_body(body)
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self {
        Self::new().with_json(&value)
    }
}

impl From<(StatusCode, &'static str)> for Response {
    fn from((status, body): (StatusCode, &'static str)) -> Self {
        Self::from_status(status).with_body(body)
    }
}
