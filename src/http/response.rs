//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response to the caller: status, headers, body
//! - Map forwarding failures to HTTP status codes
//! - Render the plaintext diagnostic report for failures
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Upstream timeouts result in 504 Gateway Timeout, other upstream
//!   failures in 502, unbuildable requests in 500
//! - The report never contains upstream content, only proxy-side facts

use std::error::Error as StdError;
use std::fmt;

use axum::body::Body;
use axum::http::header::{HeaderValue, CONTENT_TYPE};
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use hyper::body::Incoming;
use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::headers;
use crate::resilience::Deadline;

/// Why a request could not be forwarded.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The outbound request could not be constructed.
    #[error("Failed to create request")]
    Build(#[source] axum::http::Error),

    /// The upstream did not answer within the request deadline.
    #[error("Request to target server timed out")]
    Timeout,

    /// Any other failure reaching the upstream.
    #[error("Failed to forward request: {}", error_chain(.0))]
    Dispatch(#[source] hyper_util::client::legacy::Error),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ForwardError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::Dispatch(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn outcome(&self) -> ForwardOutcome {
        match self {
            ForwardError::Build(_) => ForwardOutcome::BuildFailed,
            ForwardError::Timeout => ForwardOutcome::TimedOut,
            ForwardError::Dispatch(_) => ForwardOutcome::DispatchFailed,
        }
    }
}

/// `error: cause: cause ...`, so the report shows the root cause
/// (e.g. "connection refused") and not only the outermost wrapper.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Terminal state of one forwarded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    Succeeded,
    TimedOut,
    DispatchFailed,
    BuildFailed,
}

impl ForwardOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForwardOutcome::Succeeded => "succeeded",
            ForwardOutcome::TimedOut => "timed_out",
            ForwardOutcome::DispatchFailed => "dispatch_failed",
            ForwardOutcome::BuildFailed => "build_failed",
        }
    }
}

/// Plaintext diagnostic body written for every failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub destination: String,
    pub target_url: String,
    pub node_name: Option<String>,
    pub pod_name: Option<String>,
    pub hostname: Option<String>,
    pub message: String,
}

impl ErrorReport {
    pub fn new(config: &ProxyConfig, target_url: &str, message: impl Into<String>) -> Self {
        Self {
            destination: config.target.destination(),
            target_url: target_url.to_string(),
            node_name: config.identity.node_name.clone(),
            pod_name: config.identity.pod_name.clone(),
            hostname: config.identity.hostname.clone(),
            message: message.into(),
        }
    }

    /// Write `status` with this report as a text/plain body.
    pub fn into_response(self, status: StatusCode) -> Response<Body> {
        let mut response = (status, self.to_string()).into_response();
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Destination Address    : {}", self.destination)?;
        writeln!(f, "Full URL               : {}", self.target_url)?;
        if let Some(node) = non_empty(&self.node_name) {
            writeln!(f, "Node Name              : {}", node)?;
        }
        if let Some(pod) = non_empty(&self.pod_name) {
            writeln!(f, "Pod Name               : {}", pod)?;
        }
        if let Some(host) = non_empty(&self.hostname) {
            writeln!(f, "Hostname               : {}", host)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.message)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Turn the upstream response into the caller's response.
///
/// Headers are appended one value at a time so repeated headers survive.
/// The body streams through under `deadline`; if the upstream stops mid-body
/// or the deadline passes first, the caller sees a truncated response.
pub fn relay(upstream: Response<Incoming>, deadline: &Deadline) -> Response<Body> {
    let (parts, body) = upstream.into_parts();

    let mut response = Response::new(deadline.bound_body(Body::new(body)));
    *response.status_mut() = parts.status;
    headers::copy_headers(response.headers_mut(), &parts.headers);
    response
}
