//! The parsed form of one inbound HTTP message.
//!
//! A [`Request`] is created by the wire codec for every message read from a
//! connection, enriched by the router (route parameters and decoded body) and
//! finally consumed by a handler.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A single HTTP request.
///
/// Query, cookie, form and route parameters live in separate maps, so the same
/// key may appear in several of them without conflict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    method: String,
    path: String,
    version: String,

    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,

    query: HashMap<String, String>,
    form: HashMap<String, String>,
    params: HashMap<String, String>,

    body: Bytes,
    json: Option<Value>,

    content_type: String,
    content_length: usize,
    user_agent: String,
    remote_addr: Option<SocketAddr>,
}

impl Request {
    /// Creates an empty request with the given method and path.
    ///
    /// The wire codec builds requests through [`crate::codec::parse_request`];
    /// this constructor is meant for handlers under test and for benchmarks.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self { method: method.into(), path: path.into(), version: "HTTP/1.1".into(), ..Default::default() }
    }

    /// Returns the request method exactly as it appeared on the request line.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the percent-decoded path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the protocol version string, e.g. `HTTP/1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns all headers keyed by their name as received.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Looks up a header ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Form fields, only populated for `application/x-www-form-urlencoded` bodies.
    pub fn form(&self) -> &HashMap<String, String> {
        &self.form
    }

    pub fn form_field(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    /// Route parameters captured by `:name` and `*name` segments.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The raw body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The decoded JSON body, only populated for `application/json` bodies.
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    /// Deserializes the decoded JSON body into `T`.
    ///
    /// Returns `Ok(None)` when the request carried no JSON body.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.json.as_ref().map(|value| T::deserialize(value)).transpose()
    }

    /// Deserializes the raw body as `application/x-www-form-urlencoded` into `T`.
    pub fn form_as<T: DeserializeOwned>(&self) -> Result<T, serde_urlencoded::de::Error> {
        serde_urlencoded::from_bytes(&self.body)
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The value of the `Content-Length` header, `0` when absent or unparseable.
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Returns true if the client asked to close the connection after this message.
    pub fn wants_close(&self) -> bool {
        self.header(http::header::CONNECTION.as_str()).is_some_and(|value| value.trim().eq_ignore_ascii_case("close"))
    }

    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = method.into();
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Inserts a header, keeping the dedicated content-type, content-length and
    /// user-agent fields and the cookie map in sync with it.
    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        if name.eq_ignore_ascii_case(http::header::CONTENT_TYPE.as_str()) {
            self.content_type.clone_from(&value);
        } else if name.eq_ignore_ascii_case(http::header::CONTENT_LENGTH.as_str()) {
            self.content_length = value.trim().parse().unwrap_or(0);
        } else if name.eq_ignore_ascii_case(http::header::USER_AGENT.as_str()) {
            self.user_agent.clone_from(&value);
        } else if name.eq_ignore_ascii_case(http::header::COOKIE.as_str()) {
            self.cookies.extend(crate::codec::parse_cookies(&value));
        }

        self.headers.insert(name, value);
    }

    pub fn set_query(&mut self, query: HashMap<String, String>) {
        self.query = query;
    }

    pub fn set_form(&mut self, form: HashMap<String, String>) {
        self.form = form;
    }

    /// Merges captured route parameters into the request.
    pub fn merge_params(&mut self, params: impl IntoIterator<Item = (String, String)>) {
        self.params.extend(params);
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    pub fn set_json(&mut self, json: Value) {
        self.json = Some(json);
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    pub fn set_remote_addr(&mut self, remote_addr: SocketAddr) {
        self.remote_addr = Some(remote_addr);
    }
}
