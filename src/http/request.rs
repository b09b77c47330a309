//! Request handling and transformation.
//!
//! # Responsibilities
//! - Represent the caller's request with typed connection metadata
//! - Reconstruct the upstream URL from the caller's path
//! - Build the outbound request: method, URL, copied and augmented headers,
//!   and the caller's body stream
//!
//! # Design Decisions
//! - Only the path component is forwarded; the query string is dropped
//! - The caller's Host header is not forwarded
//! - The body is handed over as a stream and never buffered
//! - Original request metadata stays available for logging

use axum::body::Body;
use axum::http::{Method, Request, Uri};
use axum::http::header::{HeaderMap, HOST};

use crate::config::TargetConfig;
use crate::http::headers::{self, ClientDetails, IdentityHeaders};
use crate::http::response::ForwardError;
use crate::net::ConnectionInfo;

/// A caller's request, as handed over by the server adapter.
pub struct InboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Body,
    pub connection: ConnectionInfo,
}

impl InboundRequest {
    pub fn from_request(request: Request<Body>, connection: ConnectionInfo) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            connection,
        }
    }

    /// The path component, without the query string.
    pub fn path(&self) -> &str {
        self.uri.path()
    }
}

/// `http://{host}:{port}{path}`. Always plain HTTP toward the upstream.
pub fn target_url(target: &TargetConfig, path: &str) -> String {
    format!("http://{}:{}{}", target.host, target.port, path)
}

/// Build the request sent upstream.
///
/// Fails without side effects when the method or URL cannot form a request.
pub fn build_outbound(
    inbound: InboundRequest,
    target_url: &str,
    identity: &IdentityHeaders,
) -> Result<Request<Body>, ForwardError> {
    let InboundRequest {
        method,
        headers: inbound_headers,
        body,
        connection,
        ..
    } = inbound;

    let mut request = Request::builder()
        .method(method)
        .uri(target_url)
        .body(body)
        .map_err(ForwardError::Build)?;

    let outbound_headers = request.headers_mut();
    headers::copy_headers(outbound_headers, &inbound_headers);
    // The upstream gets its own authority as Host.
    outbound_headers.remove(HOST);
    headers::add_client_headers(
        outbound_headers,
        ClientDetails {
            user_agent: headers::user_agent(&inbound_headers),
            local: connection.local,
            remote: connection.remote,
        },
    );
    identity.apply(outbound_headers);

    Ok(request)
}
