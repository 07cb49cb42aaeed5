//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → tls.rs (secure mode: generate key, self-sign, rustls config)
//!     → listener.rs (validate address, bind)
//! Incoming TCP connection
//!     → [TLS handshake in secure mode]
//!     → connection.rs (connection ID, TLS session metadata)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Listener mode (plain or TLS) is fixed for the life of the process
//! - The TLS identity is immutable and shared by every handshake

pub mod connection;
pub mod listener;
pub mod tls;

pub use connection::{ConnectionAcceptor, ConnectionId, ConnectionInfo, TlsSession};
pub use listener::{Listener, ListenerError, ListenerMode};
pub use tls::{BootstrapError, EphemeralIdentity};
