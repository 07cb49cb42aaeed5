//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, HTTP/1.1 + HTTP/2)
//!     → greeting or protocol handler
//!     → text/plain response
//! ```

pub mod server;

pub use server::{HttpServer, GREETING};
