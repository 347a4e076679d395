use async_trait::async_trait;
use sprig_http::protocol::{Request, Response};

/// Application logic attached to a route.
///
/// The request arrives with its route parameters bound and, for `POST` and
/// `PUT`, its body already decoded into the form map or the JSON value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, request: Request) -> Response;
}

/// a holder which turns any async `Fn(Request) -> impl Into<Response>` into a [`RequestHandler`]
#[derive(Debug)]
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Request) -> Fut,
    Fut: Future,
    Fut::Output: Into<Response>,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Into<Response>,
{
    async fn invoke(&self, request: Request) -> Response {
        (self.f)(request).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    fn assert_is_handler<T: RequestHandler>(_handler: &T) {
        // no op
    }

    #[test]
    fn async_fns_are_handlers() {
        async fn text(_request: Request) -> &'static str {
            "hello"
        }
        async fn status(_request: Request) -> StatusCode {
            StatusCode::NO_CONTENT
        }
        async fn full(_request: Request) -> Response {
            Response::new()
        }

        assert_is_handler(&handler_fn(text));
        assert_is_handler(&handler_fn(status));
        assert_is_handler(&handler_fn(full));
    }

    #[tokio::test]
    async fn return_values_become_responses() {
        let text = handler_fn(|request: Request| async move { format!("path {}", request.path()) });
        let response = text.invoke(Request::new("GET", "/a")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"path /a");

        let json = handler_fn(|_request: Request| async { json!({"ok": true}) });
        let response = json.invoke(Request::new("GET", "/")).await;
        assert_eq!(response.content_type(), "application/json");
        assert_eq!(response.body().as_ref(), br#"{"ok":true}"#);
    }
}
