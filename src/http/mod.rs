//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! diagnostic endpoints themselves.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_400_response, build_404_response, build_redirect_response_with_code,
    build_stream_response, build_text_response, full, ResponseBody, TEXT_PLAIN,
};
