//! Local IPv4 addresses, for telling a sender where to connect.
//!
//! Two sources are consulted: the addresses the host name resolves to, and
//! the source address the OS would pick for an outbound route. Either may
//! fail; a failed source is skipped rather than failing the call.

use std::collections::BTreeSet;
use std::io;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs, UdpSocket};

/// Public address used only to select a route. No packet is sent to it.
const ROUTE_PROBE_ADDR: (Ipv4Addr, u16) = (Ipv4Addr::new(8, 8, 8, 8), 80);

/// Deduplicated IPv4 addresses of this host, non-loopback first.
///
/// Blocks on name resolution; call from a blocking context.
pub fn list_local_addresses(include_loopback: bool) -> Vec<String> {
    let mut found = BTreeSet::new();

    match hostname_addresses() {
        Ok(addrs) => found.extend(addrs),
        Err(e) => tracing::debug!(error = %e, "host name resolution skipped"),
    }
    match outbound_address() {
        Ok(addr) => {
            found.insert(addr);
        }
        Err(e) => tracing::debug!(error = %e, "outbound route probe skipped"),
    }

    if include_loopback {
        found.insert(Ipv4Addr::LOCALHOST);
    }

    order_addresses(found, include_loopback)
}

fn order_addresses(
    addrs: impl IntoIterator<Item = Ipv4Addr>,
    include_loopback: bool,
) -> Vec<String> {
    let mut addrs: Vec<Ipv4Addr> = addrs
        .into_iter()
        .filter(|a| !a.is_unspecified())
        .filter(|a| include_loopback || !a.is_loopback())
        .collect();
    addrs.sort_by_key(|a| (a.is_loopback(), *a));
    addrs.dedup();
    addrs.iter().map(Ipv4Addr::to_string).collect()
}

#[cfg(unix)]
fn hostname_addresses() -> io::Result<Vec<Ipv4Addr>> {
    let name = nix::unistd::gethostname()?;
    let name = name
        .into_string()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "host name is not UTF-8"))?;
    let addrs = (name.as_str(), 0)
        .to_socket_addrs()?
        .filter_map(|sa| match sa.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .collect();
    Ok(addrs)
}

#[cfg(not(unix))]
fn hostname_addresses() -> io::Result<Vec<Ipv4Addr>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "host name lookup not supported on this platform",
    ))
}

/// Source address of the default IPv4 route. Connecting a UDP socket only
/// selects the route.
fn outbound_address() -> io::Result<Ipv4Addr> {
    let probe = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    probe.connect(ROUTE_PROBE_ADDR)?;
    match probe.local_addr()?.ip() {
        IpAddr::V4(v4) => Ok(v4),
        IpAddr::V6(_) => Err(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            "expected IPv4 local address",
        )),
    }
}
