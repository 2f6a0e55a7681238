//! Diagnostic HTTP server
//!
//! Small plain-text endpoints for checking what a client, load balancer or
//! orchestrator sees: request echo, hostname and FQDN, interface addresses,
//! environment, plus health probes that can be made to fail or kill the
//! process on demand.

pub mod config;
pub mod diag;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
