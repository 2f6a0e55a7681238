//! Host introspection module
//!
//! Everything the diagnostic endpoints report about the machine lives here,
//! independent of HTTP:
//! - Hostname and FQDN resolution
//! - Network interface addresses
//! - Process environment and request header rendering
//! - Uptime tracking and the simulated failure probe

pub mod env;
pub mod fqdn;
pub mod headers;
pub mod hostname;
pub mod interfaces;
pub mod uptime;

use thiserror::Error;

pub use fqdn::{resolve_fqdn, NameResolver, SystemResolver};
pub use hostname::hostname;
pub use uptime::{FailureSimulation, FailureState, ProcessStart};

/// Failure of a host-level query
///
/// These never become HTTP errors; handlers render them in-band as
/// `Error: <message>!`.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("hostname: {0}")]
    Hostname(nix::Error),

    #[error("interfaces: {0}")]
    Interfaces(nix::Error),

    #[error("interface {name}: {message}")]
    InterfaceAddrs { name: String, message: String },

    #[error("lookup {host}: {message}")]
    Forward { host: String, message: String },

    #[error("reverse lookup {ip}: {message}")]
    Reverse { ip: std::net::IpAddr, message: String },
}

/// Render a lookup failure the way every diagnostic endpoint reports it
pub fn error_line(err: &LookupError) -> String {
    format!("Error: {err}!\n")
}
