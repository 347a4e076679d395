use serde_json::Value;
use sprig_http::protocol::{Request, Response};
use sprig_web::config::ConfigError;
use sprig_web::{Router, Server, ServerConfig, handler_fn};
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = match ServerConfig::load_file("config.json") {
        Ok(config) => config,
        Err(ConfigError::Read { path, .. }) => {
            warn!(path = %path.display(), "config file not readable, using defaults");
            ServerConfig::default()
        }
        Err(e) => {
            error!(cause = %e, "invalid config");
            return;
        }
    };
    info!(host = %config.host, port = config.port, "using config");

    let mut router = Router::new();
    router
        .get("/status", handler_fn(status_page))
        .post("/json", handler_fn(echo_json))
        .post("/hello", handler_fn(hello))
        .get("/users/:id/*rest", handler_fn(user_path));
    if config.public_dir.is_none() {
        router.set_public_dir("public");
    }

    let server = match Server::builder().router(router).config(config).bind() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(cause = %e, "failed to listen for ctrl-c");
        }
        ctrl_c.cancel();
    });

    server.run(shutdown).await;
}

async fn status_page(_request: Request) -> &'static str {
    "<html><body><h1>Status: Online</h1></body></html>"
}

async fn echo_json(request: Request) -> Value {
    request.json().cloned().unwrap_or_default()
}

async fn hello(request: Request) -> String {
    format!("Hello {}", request.form_field("name").unwrap_or("World"))
}

async fn user_path(request: Request) -> Response {
    let id = request.param("id").unwrap_or_default();
    let rest = request.param("rest").unwrap_or_default();
    info!(id, rest, user_agent = request.user_agent(), "user path requested");
    Response::new().with_content_type("text/plain").with_body(format!("user {id} asked for {rest}\r\n"))
}
