use std::net::{IpAddr, SocketAddr, TcpListener};

use tracing::debug;

use crate::error::ServeError;

/// Check whether `port` can currently be bound on `addr`.
///
/// The probe listener is dropped immediately, releasing the port for the
/// real server to rebind.
pub fn is_port_available(addr: IpAddr, port: u16) -> bool {
    TcpListener::bind(SocketAddr::new(addr, port)).is_ok()
}

/// Find the lowest available TCP port at or after `start_port`, probing at
/// most `max_attempts` candidates in order.
///
/// Probe-then-release is inherently racy: another process may grab the
/// port between the probe and the caller's real bind. A lost race surfaces
/// as a bind failure at startup rather than being retried here.
pub fn find_available_port(
    addr: IpAddr,
    start_port: u16,
    max_attempts: u16,
) -> Result<u16, ServeError> {
    for offset in 0..max_attempts {
        let Some(port) = start_port.checked_add(offset) else {
            break;
        };
        if is_port_available(addr, port) {
            return Ok(port);
        }
        debug!("Port {} is in use, trying the next one", port);
    }

    Err(ServeError::NoPortAvailable {
        start: start_port,
        attempts: max_attempts,
    })
}
