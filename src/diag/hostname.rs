//! Local hostname lookup

use super::LookupError;

/// Query the operating system for the configured hostname
///
/// Non-UTF-8 bytes are replaced rather than treated as an error.
pub fn hostname() -> Result<String, LookupError> {
    nix::unistd::gethostname()
        .map(|name| name.to_string_lossy().into_owned())
        .map_err(LookupError::Hostname)
}

/// Body for `/` and `/hostname`
pub fn render_hostname(result: &Result<String, LookupError>) -> String {
    match result {
        Ok(name) => format!("{name}\n"),
        Err(e) => super::error_line(e),
    }
}
