//! Request header rendering for `/echoheaders`

use hyper::header::HOST;
use hyper::HeaderMap;

/// Render one `Name=[v1 v2]` line per distinct header name
///
/// Names are written in canonical MIME form (`X-Forwarded-For`) and values
/// are copied as raw bytes, in arrival order within a name. `Host` is part of
/// the request line rather than the header set and is left out. The order of
/// names is unspecified.
pub fn render_headers(headers: &HeaderMap) -> Vec<u8> {
    let mut out = Vec::new();
    for name in headers.keys().filter(|name| **name != HOST) {
        out.extend_from_slice(canonical_name(name.as_str()).as_bytes());
        out.extend_from_slice(b"=[");
        for (i, value) in headers.get_all(name).iter().enumerate() {
            if i > 0 {
                out.push(b' ');
            }
            out.extend_from_slice(value.as_bytes());
        }
        out.extend_from_slice(b"]\n");
    }
    out
}

/// Upper-case the first letter and every letter after a `-`, lower-case the rest
pub fn canonical_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}
