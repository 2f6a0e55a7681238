//! Diagnostic endpoint handlers
//!
//! Each handler is stateless apart from what it is given. Host query
//! failures are reported in the body with status 200; only `/healthz-fail`
//! and `/exit` fail on purpose.

use std::net::SocketAddr;
use std::time::Duration;

use hyper::body::{Bytes, Incoming};
use hyper::header::CONTENT_TYPE;
use hyper::{HeaderMap, Request, Response, StatusCode};

use crate::diag::{self, FailureSimulation, FailureState, NameResolver};
use crate::http::{self, ResponseBody};
use crate::logger;

fn ok(body: impl Into<Bytes>) -> Response<ResponseBody> {
    http::build_text_response(StatusCode::OK, body)
}

/// `/echo`: stream the request body back unchanged
pub fn echo(req: Request<Incoming>) -> Response<ResponseBody> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    http::build_stream_response(req.into_body(), &content_type)
}

/// `/echoheaders`
pub fn echo_headers(headers: &HeaderMap) -> Response<ResponseBody> {
    ok(diag::headers::render_headers(headers))
}

/// `/` and `/hostname`
pub fn hostname() -> Response<ResponseBody> {
    ok(diag::hostname::render_hostname(&diag::hostname()))
}

/// `/env`
pub fn env() -> Response<ResponseBody> {
    ok(diag::env::render_process_env())
}

/// `/ip`
pub fn ip() -> Response<ResponseBody> {
    let interfaces = diag::interfaces::list_interfaces();
    ok(diag::interfaces::render_interface_ips(&interfaces))
}

/// `/fqdn`
pub async fn fqdn<R: NameResolver>(resolver: &R) -> Response<ResponseBody> {
    ok(diag::fqdn::render_fqdn(diag::hostname(), resolver).await)
}

/// `/healthz`
pub fn healthz(uptime: Duration) -> Response<ResponseBody> {
    ok(diag::uptime::render_healthz(uptime))
}

/// `/healthz-fail`: 200 until the threshold, 500 afterwards
pub fn healthz_fail(simulation: &FailureSimulation, uptime: Duration) -> Response<ResponseBody> {
    let (state, body) = simulation.report(uptime);
    let status = match state {
        FailureState::Healthy { .. } => StatusCode::OK,
        FailureState::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    http::build_text_response(status, body)
}

/// `/exit/{code}`: terminate the whole process without answering
pub fn exit_process(code: i32, peer_addr: &SocketAddr) -> ! {
    logger::log_exit_requested(code, peer_addr);
    std::process::exit(code)
}
