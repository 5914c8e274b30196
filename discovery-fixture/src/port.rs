//! Port types and ephemeral port probing.
//!
//! Probing binds a transient listener to port 0, reads back the port the
//! operating system assigned, and releases the listener. The port is free at
//! the instant of the call only; another process may claim it before the
//! embedded server binds it. Prefer [`PortStrategy::BindDirect`] where the
//! server can bind port 0 itself.
//!
//! [`PortStrategy::BindDirect`]: crate::config::PortStrategy::BindDirect

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A valid network port number (1-65535).
///
/// Port 0 is rejected: it means "any port" to the operating system and can
/// never be the port a server is actually reachable on.
///
/// # Examples
///
/// ```
/// use discovery_fixture::Port;
///
/// let port = Port::try_from(9160).unwrap();
/// assert_eq!(port.value(), 9160);
///
/// assert!(Port::try_from(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Returns the underlying port number.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Port {
    type Error = InvalidPortError;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        if value == 0 {
            Err(InvalidPortError {
                value,
                reason: "port 0 is invalid".into(),
            })
        } else {
            Ok(Self(value))
        }
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for invalid port numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPortError {
    /// The invalid port value.
    pub value: u16,
    /// The reason the port is invalid.
    pub reason: String,
}

impl fmt::Display for InvalidPortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid port {}: {}", self.value, self.reason)
    }
}

impl std::error::Error for InvalidPortError {}

const WILDCARD: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);

fn bind_ephemeral() -> Result<(TcpListener, Port)> {
    let listener = TcpListener::bind(WILDCARD).map_err(|source| Error::Bind {
        address: WILDCARD,
        source,
    })?;
    let port = Port::try_from(listener.local_addr()?.port())?;
    Ok((listener, port))
}

/// Finds a TCP port that is free right now.
///
/// The probe listener is dropped before returning, on success and on error.
///
/// # Errors
///
/// Returns [`Error::Bind`] if no ephemeral port could be bound.
///
/// # Examples
///
/// ```
/// use discovery_fixture::port::find_unused_port;
///
/// let port = find_unused_port().unwrap();
/// assert!(port.value() > 0);
/// ```
pub fn find_unused_port() -> Result<Port> {
    let (_listener, port) = bind_ephemeral()?;
    Ok(port)
}

/// Finds `count` mutually distinct TCP ports that are free right now.
///
/// All probe listeners stay bound until every port has been read, so the
/// operating system cannot hand out the same port twice within one call.
///
/// # Errors
///
/// Returns [`Error::Bind`] if any probe fails; listeners bound so far are
/// released.
///
/// # Examples
///
/// ```
/// use discovery_fixture::port::find_unused_ports;
///
/// let ports = find_unused_ports(2).unwrap();
/// assert_eq!(ports.len(), 2);
/// assert_ne!(ports[0], ports[1]);
/// ```
pub fn find_unused_ports(count: usize) -> Result<Vec<Port>> {
    let mut held = Vec::with_capacity(count);
    for _ in 0..count {
        held.push(bind_ephemeral()?);
    }
    let ports = held.iter().map(|(_, port)| *port).collect();
    log::debug!("probed {count} ephemeral port(s): {ports:?}");
    Ok(ports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_port_validation() {
        assert!(Port::try_from(0).is_err());
        assert!(Port::try_from(1).is_ok());
        assert!(Port::try_from(65535).is_ok());
        assert!(Port::try_from(9160).is_ok());
    }

    #[test]
    fn test_port_invalid_error_message() {
        let err = Port::try_from(0).unwrap_err();
        assert_eq!(err.value, 0);
        assert!(err.reason.contains("invalid"));

        let lib_err: Error = err.into();
        assert!(matches!(lib_err, Error::InvalidPort { value: 0, .. }));
    }

    #[test]
    fn test_port_display() {
        let port = Port::try_from(7000).unwrap();
        assert_eq!(format!("{port}"), "7000");
    }

    #[test]
    fn test_port_serde_rejects_zero() {
        let port = Port::try_from(9160).unwrap();
        let json = serde_json::to_string(&port).unwrap();
        assert_eq!(json, "9160");
        assert_eq!(serde_json::from_str::<Port>(&json).unwrap(), port);

        assert!(serde_json::from_str::<Port>("0").is_err());
    }

    #[test]
    fn test_find_unused_port_is_bindable() {
        let port = find_unused_port().unwrap();
        // The probe listener must already be released.
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port.value()));
        assert!(listener.is_ok(), "port {port} should be bindable after probe");
    }

    #[test]
    fn test_find_unused_ports_distinct() {
        let ports = find_unused_ports(8).unwrap();
        let unique: HashSet<_> = ports.iter().copied().collect();
        assert_eq!(unique.len(), ports.len());
    }

    #[test]
    fn test_find_unused_ports_zero() {
        assert!(find_unused_ports(0).unwrap().is_empty());
    }
}
