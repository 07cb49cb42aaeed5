//! Per-connection metadata.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Capture the negotiated TLS session (if any) once the transport is up
//! - Attach both to every request served on the connection
//!
//! # Design Decisions
//! - Wraps whichever acceptor the listener mode needs (plain or rustls),
//!   so handlers see the same extension type in both modes

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::middleware::AddExtension;
use axum::Extension;
use axum_server::accept::Accept;
use futures_util::future::BoxFuture;
use tokio::net::TcpStream;
use tokio_rustls::server::TlsStream;
use tower::Layer;

/// Next connection ID; only uniqueness matters.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Negotiated TLS session parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSession {
    /// ALPN protocol picked during the handshake, e.g. `h2`.
    pub alpn_protocol: Option<String>,
    /// TLS protocol version, e.g. `TLSv1_3`.
    pub protocol_version: Option<String>,
    /// SNI host name sent by the client.
    pub server_name: Option<String>,
}

/// Metadata attached to every request on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub tls: Option<TlsSession>,
}

impl ConnectionInfo {
    pub fn new(tls: Option<TlsSession>) -> Self {
        Self {
            id: ConnectionId::new(),
            tls,
        }
    }

    /// Whether the connection is TLS-terminated.
    pub fn is_secure(&self) -> bool {
        self.tls.is_some()
    }
}

/// A stream that can report its TLS session.
pub trait Transport {
    fn tls_session(&self) -> Option<TlsSession>;
}

impl Transport for TcpStream {
    fn tls_session(&self) -> Option<TlsSession> {
        None
    }
}

impl<IO> Transport for TlsStream<IO> {
    fn tls_session(&self) -> Option<TlsSession> {
        let (_, conn) = self.get_ref();
        Some(TlsSession {
            alpn_protocol: conn
                .alpn_protocol()
                .map(|p| String::from_utf8_lossy(p).into_owned()),
            protocol_version: conn.protocol_version().map(|v| format!("{:?}", v)),
            server_name: conn.server_name().map(str::to_owned),
        })
    }
}

/// Acceptor that tags every connection with a [`ConnectionInfo`].
#[derive(Debug, Clone)]
pub struct ConnectionAcceptor<A> {
    inner: A,
}

impl<A> ConnectionAcceptor<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl<I, S, A> Accept<I, S> for ConnectionAcceptor<A>
where
    A: Accept<I, S>,
    A::Stream: Transport + Send + 'static,
    A::Service: Send + 'static,
    A::Future: Send + 'static,
{
    type Stream = A::Stream;
    type Service = AddExtension<A::Service, ConnectionInfo>;
    type Future = BoxFuture<'static, io::Result<(Self::Stream, Self::Service)>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let handshake = self.inner.accept(stream, service);

        Box::pin(async move {
            let (stream, service) = match handshake.await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::debug!(error = %e, "Connection handshake failed");
                    return Err(e);
                }
            };

            let info = ConnectionInfo::new(stream.tls_session());
            let tls = info.tls.as_ref();
            tracing::debug!(
                connection_id = %info.id,
                secure = info.is_secure(),
                alpn = tls.and_then(|t| t.alpn_protocol.as_deref()),
                tls_version = tls.and_then(|t| t.protocol_version.as_deref()),
                sni = tls.and_then(|t| t.server_name.as_deref()),
                "Connection accepted"
            );

            Ok((stream, Extension(info).layer(service)))
        })
    }
}
