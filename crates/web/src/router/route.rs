use std::collections::HashMap;
use std::fmt;

use http::Method;

use crate::handler::RequestHandler;
use crate::router::path::split_path;

/// One component of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches the path segment exactly.
    Literal(String),
    /// `:name`, binds one path segment.
    Param(String),
    /// `*name`, binds every remaining segment joined with `/`.
    Wildcard(String),
}

impl Segment {
    fn parse(segment: &str) -> Self {
        if let Some(name) = segment.strip_prefix(':').filter(|name| !name.is_empty()) {
            Self::Param(name.to_owned())
        } else if let Some(name) = segment.strip_prefix('*').filter(|name| !name.is_empty()) {
            Self::Wildcard(name.to_owned())
        } else {
            Self::Literal(segment.to_owned())
        }
    }
}

/// A registered method, pattern and handler.
pub struct Route {
    method: Method,
    segments: Vec<Segment>,
    handler: Box<dyn RequestHandler>,
}

impl Route {
    pub fn new(method: Method, pattern: &str, handler: Box<dyn RequestHandler>) -> Self {
        let segments = split_path(pattern).map(Segment::parse).collect();
        Self { method, segments, handler }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn handler(&self) -> &dyn RequestHandler {
        self.handler.as_ref()
    }

    /// Matches the segments of a normalized path against this route's pattern,
    /// returning the captured parameters on success.
    pub fn matches(&self, path: &[&str]) -> Option<HashMap<String, String>> {
        let mut params = HashMap::new();
        let mut remaining = path;

        for segment in &self.segments {
            match segment {
                Segment::Wildcard(name) => {
                    if remaining.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), remaining.join("/"));
                    return Some(params);
                }
                Segment::Param(name) => {
                    let (value, rest) = remaining.split_first()?;
                    params.insert(name.clone(), (*value).to_owned());
                    remaining = rest;
                }
                Segment::Literal(literal) => {
                    let (value, rest) = remaining.split_first()?;
                    if *value != literal.as_str() {
                        return None;
                    }
                    remaining = rest;
                }
            }
        }

        remaining.is_empty().then_some(params)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("method", &self.method).field("segments", &self.segments).finish_non_exhaustive()
    }
}
