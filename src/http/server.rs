//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the greeting and protocol handlers
//! - Serve HTTP/1.1 and HTTP/2 over the selected listener
//! - Log the remote address of every request
//! - Stop accepting on shutdown and drain in-flight connections

use axum::{
    extract::ConnectInfo,
    http::{header, Version},
    response::{IntoResponse, Response},
    routing::any,
    Extension, Router,
};
use axum_server::accept::DefaultAcceptor;
use axum_server::tls_rustls::RustlsAcceptor;
use axum_server::Handle;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::lifecycle::ShutdownSignal;
use crate::net::connection::{ConnectionAcceptor, ConnectionInfo};
use crate::net::listener::{Listener, ListenerMode};

/// Body served on `/` and every unmatched path.
pub const GREETING: &str = "Hello World!\n";

/// How long in-flight connections get to finish after shutdown.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

const TEXT_PLAIN: &str = "text/plain";

/// HTTP server answering with fixed plain-text bodies.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let router = Self::build_router(&config);
        Self { router, config }
    }

    /// Build the Axum router.
    ///
    /// Anything that is not `/protocol` gets the greeting, mirroring a
    /// catch-all root pattern.
    pub fn build_router(config: &ServerConfig) -> Router {
        let mut router = Router::new().route("/", any(greeting_handler));
        if config.enable_protocol_route {
            router = router.route("/protocol", any(protocol_handler));
        }
        router
            .fallback(greeting_handler)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(self, listener: Listener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            secure = listener.is_secure(),
            protocol_route = self.config.enable_protocol_route,
            "HTTP server starting"
        );

        let handle = Handle::new();
        tokio::spawn(drain_on_shutdown(handle.clone(), shutdown));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let (tcp, mode) = listener.into_parts();

        match mode {
            ListenerMode::Plain => {
                axum_server::from_tcp(tcp)
                    .acceptor(ConnectionAcceptor::new(DefaultAcceptor::new()))
                    .handle(handle)
                    .serve(app)
                    .await?
            }
            ListenerMode::Secure { config, .. } => {
                axum_server::from_tcp(tcp)
                    .acceptor(ConnectionAcceptor::new(RustlsAcceptor::new(config)))
                    .handle(handle)
                    .serve(app)
                    .await?
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn drain_on_shutdown(handle: Handle, shutdown: ShutdownSignal) {
    shutdown.recv().await;
    tracing::info!(
        open_connections = handle.connection_count(),
        grace_period = ?SHUTDOWN_GRACE_PERIOD,
        "Draining connections"
    );
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
}

fn plain_text(body: impl Into<String>) -> Response {
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], body.into()).into_response()
}

/// Fixed greeting.
async fn greeting_handler(
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    Extension(conn): Extension<ConnectionInfo>,
) -> Response {
    tracing::info!(remote_addr = %remote_addr, connection_id = %conn.id, "Serving");
    plain_text(GREETING)
}

/// Reports the HTTP version and whether the connection is TLS-terminated.
async fn protocol_handler(
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    Extension(conn): Extension<ConnectionInfo>,
    version: Version,
) -> Response {
    tracing::info!(remote_addr = %remote_addr, connection_id = %conn.id, "Serving");
    plain_text(protocol_line(version, conn.is_secure()))
}

/// e.g. `HTTP/2.0 over secure connection.`
pub fn protocol_line(version: Version, secure: bool) -> String {
    let security = if secure { "secure" } else { "insecure" };
    format!("{:?} over {} connection.\n", version, security)
}
