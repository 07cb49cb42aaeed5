//! Observability subsystem.
//!
//! Structured logging through `tracing`. Every request logs its remote
//! address and connection ID; startup logs the bound address and TLS state.

pub mod logging;

pub use logging::{init_logging, LogFormat};
