//! The seam between a connection and the code that answers its requests.

use async_trait::async_trait;

use crate::protocol::{Request, Response};

/// Answers one request.
///
/// Handlers never fail: every outcome, including routing and decoding
/// errors, is expressed as a [`Response`].
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: Request) -> Response;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send,
{
    async fn call(&self, request: Request) -> Response {
        (self.f)(request).await
    }
}

pub fn make_handler<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut,
    Fut: Future<Output = Response>,
{
    HandlerFn { f }
}
