//! Network interface address enumeration for `/ip`

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddrV4, SocketAddrV6};

use nix::ifaddrs::InterfaceAddress;
use nix::sys::socket::{AddressFamily, SockaddrLike, SockaddrStorage};

use super::LookupError;

/// An address bound to an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceAddr {
    /// Address reported together with its netmask
    Network { ip: IpAddr, prefix: u8 },
    /// Address reported without a netmask
    Ip(IpAddr),
    /// Some other address family; renders as a blank line
    Unrecognized,
}

impl InterfaceAddr {
    /// Bare IP with any prefix stripped
    pub const fn ip(&self) -> Option<IpAddr> {
        match self {
            Self::Network { ip, .. } | Self::Ip(ip) => Some(*ip),
            Self::Unrecognized => None,
        }
    }
}

/// One interface and the result of listing its addresses
#[derive(Debug)]
pub struct NetInterface {
    pub name: String,
    pub addrs: Result<Vec<InterfaceAddr>, LookupError>,
}

/// List interfaces in kernel order, grouping addresses under their interface
pub fn list_interfaces() -> Result<Vec<NetInterface>, LookupError> {
    let entries = nix::ifaddrs::getifaddrs().map_err(LookupError::Interfaces)?;

    let mut interfaces: Vec<NetInterface> = Vec::new();
    for entry in entries {
        let addr = classify(&entry);
        let idx = match interfaces.iter().position(|i| i.name == entry.interface_name) {
            Some(idx) => idx,
            None => {
                interfaces.push(NetInterface {
                    name: entry.interface_name.clone(),
                    addrs: Ok(Vec::new()),
                });
                interfaces.len() - 1
            }
        };
        if let (Some(addr), Ok(addrs)) = (addr, interfaces[idx].addrs.as_mut()) {
            addrs.push(addr);
        }
    }
    Ok(interfaces)
}

/// Map a raw `getifaddrs` entry to an interface address
///
/// Link-layer entries describe the interface itself rather than a bound
/// address and are skipped, as are entries with no address at all.
fn classify(entry: &InterfaceAddress) -> Option<InterfaceAddr> {
    let addr = entry.address.as_ref()?;

    if let Some(sin) = addr.as_sockaddr_in() {
        let ip = *SocketAddrV4::from(*sin).ip();
        let prefix = entry.netmask.as_ref().and_then(ipv4_prefix);
        return Some(with_prefix(IpAddr::V4(ip), prefix));
    }
    if let Some(sin6) = addr.as_sockaddr_in6() {
        let ip = *SocketAddrV6::from(*sin6).ip();
        let prefix = entry.netmask.as_ref().and_then(ipv6_prefix);
        return Some(with_prefix(IpAddr::V6(ip), prefix));
    }
    if is_link_layer(addr) {
        return None;
    }
    Some(InterfaceAddr::Unrecognized)
}

const fn with_prefix(ip: IpAddr, prefix: Option<u8>) -> InterfaceAddr {
    match prefix {
        Some(prefix) => InterfaceAddr::Network { ip, prefix },
        None => InterfaceAddr::Ip(ip),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn ipv4_prefix(mask: &SockaddrStorage) -> Option<u8> {
    let mask: Ipv4Addr = *SocketAddrV4::from(*mask.as_sockaddr_in()?).ip();
    Some(u32::from(mask).count_ones() as u8)
}

#[allow(clippy::cast_possible_truncation)]
fn ipv6_prefix(mask: &SockaddrStorage) -> Option<u8> {
    let mask: Ipv6Addr = *SocketAddrV6::from(*mask.as_sockaddr_in6()?).ip();
    Some(u128::from(mask).count_ones() as u8)
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn is_link_layer(addr: &SockaddrStorage) -> bool {
    addr.family() == Some(AddressFamily::Packet)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn is_link_layer(addr: &SockaddrStorage) -> bool {
    addr.family() == Some(AddressFamily::Link)
}

/// Render one IP per line
///
/// An interface whose address listing failed ends the output with an error
/// line; lines already rendered for earlier interfaces are kept.
pub fn render_ips(interfaces: &[NetInterface]) -> String {
    let mut out = String::new();
    for iface in interfaces {
        match &iface.addrs {
            Ok(addrs) => {
                for addr in addrs {
                    if let Some(ip) = addr.ip() {
                        out.push_str(&ip.to_string());
                    }
                    out.push('\n');
                }
            }
            Err(e) => {
                out.push_str(&super::error_line(e));
                return out;
            }
        }
    }
    out
}

/// Body for `/ip`
pub fn render_interface_ips(result: &Result<Vec<NetInterface>, LookupError>) -> String {
    match result {
        Ok(interfaces) => render_ips(interfaces),
        Err(e) => super::error_line(e),
    }
}
