//! Configuration schema definitions.
//!
//! The server is driven by a single immutable [`ServerConfig`], built once at
//! startup from the command line and handed to the listener and the router.

/// Default listen address: every interface, port 3000.
pub const DEFAULT_LISTEN_ADDRESS: &str = ":3000";

/// Root configuration for the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Serve HTTPS using an ephemeral self-signed certificate.
    pub enable_tls: bool,

    /// Listen address (e.g., ":3000", "127.0.0.1:8443", "[::1]:3000").
    pub listen_address: String,

    /// Advertise HTTP/2 alongside HTTP/1.1 via ALPN (TLS only).
    pub advertise_h2: bool,

    /// Serve `/protocol`; when off the path falls through to the greeting.
    pub enable_protocol_route: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enable_tls: false,
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            advertise_h2: true,
            enable_protocol_route: true,
        }
    }
}

impl ServerConfig {
    /// Plain HTTP on the given address, everything else default.
    pub fn plain(listen_address: impl Into<String>) -> Self {
        Self {
            listen_address: listen_address.into(),
            ..Self::default()
        }
    }

    /// HTTPS on the given address, everything else default.
    pub fn secure(listen_address: impl Into<String>) -> Self {
        Self {
            enable_tls: true,
            listen_address: listen_address.into(),
            ..Self::default()
        }
    }
}
