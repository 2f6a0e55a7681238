//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Routes match on the path only;
//! every method reaches the endpoint.

use crate::config::{AppState, ProbesConfig};
use crate::handler::endpoints;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::body::{Body, Incoming};
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Diagnostic endpoints, one per route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Hostname,
    Echo,
    EchoHeaders,
    Fqdn,
    Ip,
    Env,
    Healthz,
    HealthzFail,
    /// Raw digit string from `/exit/{code}`
    Exit(String),
}

impl Endpoint {
    /// Match an exact path
    pub fn from_path(path: &str) -> Option<Self> {
        let endpoint = match path {
            "/" | "/hostname" => Self::Hostname,
            "/echo" => Self::Echo,
            "/echoheaders" => Self::EchoHeaders,
            "/fqdn" => Self::Fqdn,
            "/ip" => Self::Ip,
            "/env" => Self::Env,
            "/healthz" => Self::Healthz,
            "/healthz-fail" => Self::HealthzFail,
            _ => {
                let code = path.strip_prefix("/exit/")?;
                if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                Self::Exit(code.to_string())
            }
        };
        Some(endpoint)
    }

    /// Whether configuration enables this endpoint
    pub const fn is_enabled(&self, probes: &ProbesConfig) -> bool {
        match self {
            Self::Healthz => probes.healthz,
            Self::HealthzFail => probes.healthz_fail,
            Self::Exit(_) => probes.exit,
            _ => true,
        }
    }
}

/// Outcome of matching a request path
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch {
    Endpoint(Endpoint),
    /// Known route with a trailing slash; redirect to the canonical path
    Redirect(String),
    NotFound,
}

/// Resolve a path (and query, kept across redirects) to a route
pub fn resolve(path: &str, query: Option<&str>, probes: &ProbesConfig) -> RouteMatch {
    let enabled = |path: &str| Endpoint::from_path(path).filter(|e| e.is_enabled(probes));

    if let Some(endpoint) = enabled(path) {
        return RouteMatch::Endpoint(endpoint);
    }

    if let Some(trimmed) = path.strip_suffix('/').filter(|p| !p.is_empty()) {
        if enabled(trimmed).is_some() {
            let target = match query {
                Some(q) => format!("{trimmed}?{q}"),
                None => trimmed.to_string(),
            };
            return RouteMatch::Redirect(target);
        }
    }

    RouteMatch::NotFound
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let access_log = state.config.logging.access_log;
    let mut entry = access_log.then(|| AccessLogEntry::from_request(&req, peer_addr));

    let route = resolve(req.uri().path(), req.uri().query(), &state.config.probes);
    let response = match route {
        RouteMatch::Endpoint(endpoint) => dispatch(endpoint, req, &state, peer_addr).await,
        RouteMatch::Redirect(target) => {
            http::build_redirect_response_with_code(&target, StatusCode::MOVED_PERMANENTLY)
        }
        RouteMatch::NotFound => http::build_404_response(),
    };

    if let Some(entry) = entry.as_mut() {
        entry.finish(
            response.status().as_u16(),
            response.body().size_hint().exact(),
            started.elapsed(),
        );
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch(
    endpoint: Endpoint,
    req: Request<Incoming>,
    state: &AppState,
    peer_addr: SocketAddr,
) -> Response<ResponseBody> {
    match endpoint {
        Endpoint::Hostname => endpoints::hostname(),
        Endpoint::Echo => endpoints::echo(req),
        Endpoint::EchoHeaders => endpoints::echo_headers(req.headers()),
        Endpoint::Fqdn => endpoints::fqdn(&state.resolver).await,
        Endpoint::Ip => endpoints::ip(),
        Endpoint::Env => endpoints::env(),
        Endpoint::Healthz => endpoints::healthz(state.started.uptime()),
        Endpoint::HealthzFail => endpoints::healthz_fail(&state.failure, state.started.uptime()),
        Endpoint::Exit(raw) => match raw.parse::<i32>() {
            Ok(code) => endpoints::exit_process(code, &peer_addr),
            Err(_) => http::build_400_response(&format!("exit code {raw} out of range")),
        },
    }
}
