//! Path-based routing of requests to handlers.
//!
//! Routes are tried in the order they were registered and the first one whose
//! method and pattern match wins, so a more specific pattern registered after a
//! broader one is never reached. A pattern is a `/`-separated list of segments:
//!
//! - `users`: a literal, matched exactly
//! - `:id`: binds one segment to the route parameter `id`
//! - `*rest`: binds all remaining segments (at least one) joined with `/`
//!
//! When no route matches a `GET`, the router falls back to the static file
//! directory, if one is set.

mod path;
mod route;

pub use path::normalize_path;
pub use path::split_path;
pub use route::Route;
pub use route::Segment;

use std::path::PathBuf;

use async_trait::async_trait;
use http::{Method, StatusCode};
use sprig_http::codec::DEFAULT_MAX_REQUEST_SIZE;
use sprig_http::handler::Handler;
use sprig_http::protocol::{Request, Response};
use tracing::{debug, error, info, warn};

use crate::extract::decode_body;
use crate::handler::RequestHandler;
use crate::static_files::StaticFiles;

const ALLOWED_METHODS: [Method; 7] =
    [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH, Method::OPTIONS, Method::HEAD];

/// Main router structure that handles HTTP request routing
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    static_files: Option<StaticFiles>,
    max_request_size: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self { routes: Vec::new(), static_files: None, max_request_size: DEFAULT_MAX_REQUEST_SIZE }
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` requests whose path matches `pattern`.
    ///
    /// The method is case-insensitive and must be one of `GET`, `POST`, `PUT`,
    /// `DELETE`, `PATCH`, `OPTIONS` or `HEAD`; anything else is logged and ignored.
    pub fn register<H>(&mut self, method: &str, pattern: &str, handler: H) -> &mut Self
    where
        H: RequestHandler + 'static,
    {
        let normalized = method.trim().to_ascii_uppercase();
        let Some(method) = ALLOWED_METHODS.into_iter().find(|allowed| allowed.as_str() == normalized) else {
            warn!(method = %normalized, pattern, "unsupported method, route ignored");
            return self;
        };

        info!(%method, pattern, "route created");
        self.routes.push(Route::new(method, pattern, Box::new(handler)));
        self
    }

    pub fn get<H: RequestHandler + 'static>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.register(Method::GET.as_str(), pattern, handler)
    }

    pub fn post<H: RequestHandler + 'static>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.register(Method::POST.as_str(), pattern, handler)
    }

    pub fn put<H: RequestHandler + 'static>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.register(Method::PUT.as_str(), pattern, handler)
    }

    pub fn delete<H: RequestHandler + 'static>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.register(Method::DELETE.as_str(), pattern, handler)
    }

    /// Serves files below `root` for `GET` requests no route matches.
    pub fn set_public_dir(&mut self, root: impl Into<PathBuf>) -> &mut Self {
        let static_files = StaticFiles::new(root);
        info!(root = %static_files.root().display(), "static files enabled");
        self.static_files = Some(static_files);
        self
    }

    pub fn has_public_dir(&self) -> bool {
        self.static_files.is_some()
    }

    /// Bodies, declared or received, above this many bytes are answered with 413.
    pub fn set_max_request_size(&mut self, max_request_size: usize) -> &mut Self {
        self.max_request_size = max_request_size;
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes `request` and produces the response for it.
    pub async fn dispatch(&self, mut request: Request) -> Response {
        if request.body().len() > self.max_request_size || request.content_length() > self.max_request_size {
            warn!(
                content_length = request.content_length(),
                max_size = self.max_request_size,
                "request body too large"
            );
            return Response::from_status(StatusCode::PAYLOAD_TOO_LARGE);
        }

        let Some(path) = normalize_path(request.path()) else {
            debug!(path = request.path(), "path escapes the root");
            return Response::from_status(StatusCode::BAD_REQUEST);
        };

        let segments = split_path(&path).collect::<Vec<_>>();
        let matched = self
            .routes
            .iter()
            .filter(|route| route.method().as_str() == request.method())
            .find_map(|route| route.matches(&segments).map(|params| (route, params)));

        if let Some((route, params)) = matched {
            request.merge_params(params);

            let method = request.method();
            if (method == Method::POST.as_str() || method == Method::PUT.as_str())
                && let Err(e) = decode_body(&mut request)
            {
                debug!(cause = %e, "rejecting request body");
                return Response::from_status(e.status());
            }

            return route.handler().invoke(request).await;
        }

        if request.method() == Method::GET.as_str()
            && let Some(static_files) = &self.static_files
        {
            match static_files.load(&path).await {
                Ok(Some(bytes)) => return Response::new().with_body(bytes),
                Ok(None) => {}
                Err(e) => error!(cause = %e, path = %path, "failed to read static file"),
            }
        }

        Response::from_status(StatusCode::NOT_FOUND)
    }
}

#[async_trait]
impl Handler for Router {
    async fn call(&self, request: Request) -> Response {
        self.dispatch(request).await
    }
}
