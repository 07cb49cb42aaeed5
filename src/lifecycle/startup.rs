//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener (bootstrapping the TLS identity first in secure mode)
//! - Wire OS signals to graceful shutdown
//! - Run the HTTP server until it stops
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned before traffic is accepted

use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::listener::{Listener, ListenerError};

/// Error type for a full server run.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("serve: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bind, serve, and return once a termination signal has drained the server.
pub async fn run(config: ServerConfig) -> Result<(), StartupError> {
    let listener = Listener::bind(&config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_task = signals::spawn_signal_listener(shutdown);

    let result = HttpServer::new(config).run(listener, server_shutdown).await;
    signal_task.abort();

    result?;
    Ok(())
}
