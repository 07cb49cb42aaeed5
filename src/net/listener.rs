//! Listener selection and binding.
//!
//! # Responsibilities
//! - Validate the configured listen address
//! - Bootstrap the ephemeral TLS identity when secure mode is requested
//! - Bind the TCP socket, failing fast on any error
//!
//! # Design Decisions
//! - The TLS identity is generated before the socket is opened, so a
//!   bootstrap failure never leaves a half-started listener behind
//! - The mode is fixed at bind time; there is no plain/TLS switch later

use std::net::SocketAddr;

use axum_server::tls_rustls::RustlsConfig;
use rustls::pki_types::CertificateDer;
use thiserror::Error;

use crate::config::validation::{parse_listen_address, ValidationError};
use crate::config::ServerConfig;
use crate::net::tls::{self, BootstrapError};

/// Error type for listener construction.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listen address could not be parsed or resolved.
    #[error("invalid listen address: {0}")]
    InvalidAddress(#[from] ValidationError),

    /// The ephemeral TLS identity could not be generated.
    #[error("generate TLS config: {0}")]
    Bootstrap(#[from] BootstrapError),

    /// Failed to bind to address.
    #[error("listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// How accepted connections are handled.
#[derive(Clone)]
pub enum ListenerMode {
    /// Raw TCP.
    Plain,
    /// TLS handshake on every accepted connection.
    Secure {
        config: RustlsConfig,
        certificate: CertificateDer<'static>,
    },
}

impl std::fmt::Debug for ListenerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerMode::Plain => f.write_str("Plain"),
            ListenerMode::Secure { .. } => f.write_str("Secure"),
        }
    }
}

/// A bound listening socket plus the way its connections are terminated.
#[derive(Debug)]
pub struct Listener {
    inner: std::net::TcpListener,
    mode: ListenerMode,
}

impl Listener {
    /// Bind according to `config`.
    pub fn bind(config: &ServerConfig) -> Result<Self, ListenerError> {
        let addr = parse_listen_address(&config.listen_address)?;

        let mode = if config.enable_tls {
            let (identity, tls_config) = tls::bootstrap(config.advertise_h2)?;
            tracing::info!(
                not_after = %identity.not_after(),
                advertise_h2 = config.advertise_h2,
                "Ephemeral TLS identity ready"
            );
            ListenerMode::Secure {
                config: RustlsConfig::from_config(tls_config),
                certificate: identity.certificate().clone(),
            }
        } else {
            ListenerMode::Plain
        };

        let inner = std::net::TcpListener::bind(addr)
            .and_then(|listener| listener.set_nonblocking(true).map(|_| listener))
            .map_err(|source| ListenerError::Bind { addr, source })?;

        let local_addr = inner
            .local_addr()
            .map_err(|source| ListenerError::Bind { addr, source })?;

        tracing::info!(
            address = %local_addr,
            secure = config.enable_tls,
            "Listener bound"
        );

        Ok(Self { inner, mode })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    pub fn is_secure(&self) -> bool {
        matches!(self.mode, ListenerMode::Secure { .. })
    }

    /// The certificate presented to clients, in secure mode.
    pub fn certificate(&self) -> Option<&CertificateDer<'static>> {
        match &self.mode {
            ListenerMode::Plain => None,
            ListenerMode::Secure { certificate, .. } => Some(certificate),
        }
    }

    pub fn into_parts(self) -> (std::net::TcpListener, ListenerMode) {
        (self.inner, self.mode)
    }
}
