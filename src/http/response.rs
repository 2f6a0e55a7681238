//! HTTP response building module
//!
//! Provides builders for the responses the diagnostic endpoints send,
//! decoupled from specific business logic.

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONTENT_TYPE, LOCATION};
use hyper::{Response, StatusCode};

/// Body type shared by buffered and streamed responses
pub type ResponseBody = BoxBody<Bytes, hyper::Error>;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Wrap buffered bytes as a response body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Build plain-text response with the given status
///
/// The body is sent as given; it is not required to be valid UTF-8.
pub fn build_text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(full(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full(Bytes::new()))
        })
}

/// Build response that streams the request body straight back
pub fn build_stream_response(body: Incoming, content_type: &str) -> Response<ResponseBody> {
    match Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .body(())
    {
        Ok(resp) => resp.map(|()| body.boxed()),
        Err(e) => {
            log_build_error("200", &e);
            Response::new(body.boxed())
        }
    }
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, "404 page not found\n".to_string())
}

/// Build 400 Bad Request response
pub fn build_400_response(reason: &str) -> Response<ResponseBody> {
    build_text_response(StatusCode::BAD_REQUEST, format!("400 Bad Request: {reason}\n"))
}

/// Build redirect response with custom status code
pub fn build_redirect_response_with_code(target: &str, code: StatusCode) -> Response<ResponseBody> {
    Response::builder()
        .status(code)
        .header(LOCATION, target)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(full(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(code.as_str(), &e);
            Response::new(full(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
