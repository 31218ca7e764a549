use std::net::IpAddr;

use local_ip_address::list_afinet_netifas;
use serde::Serialize;
use tracing::debug;

/// One reachable address of the host
#[derive(Debug, Clone, Serialize)]
pub struct NetworkIp {
    pub address: String,
    pub interface: String,
}

/// Enumerate non-loopback IPv4 addresses, one per interface entry.
///
/// Enumeration failure degrades to an empty list; the server is still
/// reachable via loopback.
pub fn network_ips() -> Vec<NetworkIp> {
    match list_afinet_netifas() {
        Ok(interfaces) => interfaces
            .into_iter()
            .filter(|(_, ip)| matches!(ip, IpAddr::V4(v4) if !v4.is_loopback()))
            .map(|(name, ip)| NetworkIp {
                address: ip.to_string(),
                interface: name,
            })
            .collect(),
        Err(err) => {
            debug!("Could not enumerate network interfaces: {}", err);
            Vec::new()
        }
    }
}

/// Host name as reported by the OS.
pub fn hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}
