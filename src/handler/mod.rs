//! Request handler module
//!
//! Responsible for route dispatch and the diagnostic endpoints.

pub mod endpoints;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
