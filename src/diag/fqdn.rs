//! Fully-qualified domain name resolution
//!
//! The FQDN is found by a forward lookup of the local hostname followed by a
//! PTR lookup of the first IPv4 address returned. Every failure past the
//! hostname lookup degrades to the plain hostname.

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};

use hickory_resolver::TokioAsyncResolver;

use super::LookupError;
use crate::logger;

/// DNS operations needed to resolve the FQDN
pub trait NameResolver: Send + Sync {
    /// Forward lookup of a host name to its addresses, in resolver order
    fn lookup_ip(
        &self,
        host: &str,
    ) -> impl Future<Output = Result<Vec<IpAddr>, LookupError>> + Send;

    /// Reverse (PTR) lookup of an address
    fn lookup_addr(
        &self,
        ip: IpAddr,
    ) -> impl Future<Output = Result<Vec<String>, LookupError>> + Send;
}

/// Resolver backed by the host's configuration
///
/// Forward lookups go through the system resolver (`getaddrinfo`), so
/// `/etc/hosts` and NSS apply. Reverse lookups use hickory configured from
/// `/etc/resolv.conf`.
pub struct SystemResolver {
    reverse: Option<TokioAsyncResolver>,
}

impl SystemResolver {
    pub fn from_system_conf() -> Self {
        let reverse = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => Some(resolver),
            Err(e) => {
                logger::log_warning(&format!(
                    "DNS resolver unavailable, /fqdn will report the plain hostname: {e}"
                ));
                None
            }
        };
        Self { reverse }
    }
}

impl NameResolver for SystemResolver {
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, LookupError> {
        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| LookupError::Forward {
                host: host.to_string(),
                message: e.to_string(),
            })?;
        Ok(addrs.map(|sa| sa.ip()).collect())
    }

    async fn lookup_addr(&self, ip: IpAddr) -> Result<Vec<String>, LookupError> {
        let Some(resolver) = &self.reverse else {
            return Err(LookupError::Reverse {
                ip,
                message: "no resolver configured".to_string(),
            });
        };
        let names = resolver
            .reverse_lookup(ip)
            .await
            .map_err(|e| LookupError::Reverse {
                ip,
                message: e.to_string(),
            })?;
        Ok(names.iter().map(ToString::to_string).collect())
    }
}

/// Treat IPv4-mapped IPv6 addresses as IPv4
fn as_ipv4(ip: &IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(*v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

/// Resolve the FQDN of `hostname`, falling back to `hostname` itself
pub async fn resolve_fqdn<R: NameResolver>(hostname: &str, resolver: &R) -> String {
    let addrs = match resolver.lookup_ip(hostname).await {
        Ok(addrs) => addrs,
        Err(e) => {
            logger::log_debug(&format!("[FQDN] {e}, using hostname"));
            return hostname.to_string();
        }
    };

    let Some(ipv4) = addrs.iter().find_map(as_ipv4) else {
        logger::log_debug(&format!("[FQDN] no IPv4 address for {hostname}, using hostname"));
        return hostname.to_string();
    };

    match resolver.lookup_addr(IpAddr::V4(ipv4)).await {
        Ok(names) => match names.first() {
            Some(name) => name.strip_suffix('.').unwrap_or(name).to_string(),
            None => hostname.to_string(),
        },
        Err(e) => {
            logger::log_debug(&format!("[FQDN] {e}, using hostname"));
            hostname.to_string()
        }
    }
}

/// Body for `/fqdn`
pub async fn render_fqdn<R: NameResolver>(
    hostname: Result<String, LookupError>,
    resolver: &R,
) -> String {
    match hostname {
        Ok(name) => format!("{}\n", resolve_fqdn(&name, resolver).await),
        Err(e) => super::error_line(&e),
    }
}
