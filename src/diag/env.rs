//! Process environment dump

use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;

/// Render `KEY=VALUE` lines for the given variables, in iteration order
///
/// Keys and values are copied byte for byte, including values that are not
/// valid UTF-8.
pub fn render_env<I>(vars: I) -> Vec<u8>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut out = Vec::new();
    for (key, value) in vars {
        out.extend_from_slice(key.as_bytes());
        out.push(b'=');
        out.extend_from_slice(value.as_bytes());
        out.push(b'\n');
    }
    out
}

/// Render the current process environment
pub fn render_process_env() -> Vec<u8> {
    render_env(std::env::vars_os())
}
