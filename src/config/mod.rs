//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line (clap)
//!     → ServerConfig (immutable)
//!     → validation.rs (listen address → SocketAddr)
//!     → shared by reference with listener and router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once built; there is no reload path
//! - All fields have defaults matching the full-featured server

pub mod schema;
pub mod validation;

pub use schema::ServerConfig;
pub use validation::{parse_listen_address, ValidationError};
