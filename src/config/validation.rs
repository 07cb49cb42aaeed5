//! Listen address validation.
//!
//! # Responsibilities
//! - Turn the user-facing listen address into a concrete `SocketAddr`
//! - Accept the `:PORT` shorthand for "all interfaces"
//!
//! # Design Decisions
//! - Host names are resolved once, at startup; the first result wins
//! - Validation runs before any key material is generated

use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};

use thiserror::Error;

/// A listen address that cannot be turned into a socket address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listen address is empty")]
    Empty,

    #[error("listen address '{0}' has no port")]
    MissingPort(String),

    #[error("listen address '{address}' has an invalid port '{port}'")]
    InvalidPort { address: String, port: String },

    #[error("listen address '{0}' does not resolve")]
    Unresolvable(String),
}

/// Parse a listen address.
///
/// Accepted forms: `:3000`, `0.0.0.0:3000`, `[::1]:3000`, `localhost:3000`.
/// `:PORT` means every IPv4 interface; use `[::]:PORT` for IPv6.
pub fn parse_listen_address(address: &str) -> Result<SocketAddr, ValidationError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ValidationError::Empty);
    }

    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Ok(addr);
    }

    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| ValidationError::MissingPort(address.to_string()))?;
    let port: u16 = port.parse().map_err(|_| ValidationError::InvalidPort {
        address: address.to_string(),
        port: port.to_string(),
    })?;

    if host.is_empty() {
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }

    (host, port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| ValidationError::Unresolvable(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_only_binds_all_interfaces() {
        let addr = parse_listen_address(":3000").unwrap();
        assert_eq!(addr, "0.0.0.0:3000".parse().unwrap());
        assert!(addr.is_ipv4());
    }

    #[test]
    fn ipv6_wildcard_is_explicit() {
        let addr = parse_listen_address("[::]:3000").unwrap();
        assert!(addr.is_ipv6());
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn explicit_socket_addresses() {
        assert_eq!(
            parse_listen_address("127.0.0.1:8443").unwrap(),
            "127.0.0.1:8443".parse().unwrap()
        );
        assert_eq!(
            parse_listen_address("[::1]:9000").unwrap(),
            "[::1]:9000".parse().unwrap()
        );
    }

    #[test]
    fn localhost_resolves_to_loopback() {
        let addr = parse_listen_address("localhost:0").unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 0);
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert_eq!(parse_listen_address("  "), Err(ValidationError::Empty));
        assert_eq!(
            parse_listen_address("localhost"),
            Err(ValidationError::MissingPort("localhost".into()))
        );
        assert!(matches!(
            parse_listen_address(":http"),
            Err(ValidationError::InvalidPort { .. })
        ));
        assert!(matches!(
            parse_listen_address(":70000"),
            Err(ValidationError::InvalidPort { .. })
        ));
    }
}
