//! Header propagation and augmentation.
//!
//! # Responsibilities
//! - Copy headers between requests and responses, every value, in order
//! - Add the X-Proxied-Client-* headers describing the caller
//! - Add the X-Proxy-* headers describing this proxy instance
//!
//! # Design Decisions
//! - Copies append, never replace, so repeated headers survive untouched
//! - Augmentation uses insert: a proxy header is present exactly once even if
//!   the caller sent one with the same name

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::net::SocketAddr;

use crate::config::IdentityConfig;

pub const X_PROXIED_CLIENT_AGENT: HeaderName = HeaderName::from_static("x-proxied-client-agent");
pub const X_PROXIED_CLIENT_DESTINATION: HeaderName =
    HeaderName::from_static("x-proxied-client-destination");
pub const X_PROXIED_CLIENT_SOURCE: HeaderName = HeaderName::from_static("x-proxied-client-source");
pub const X_PROXY_NODE: HeaderName = HeaderName::from_static("x-proxy-node");
pub const X_PROXY_POD: HeaderName = HeaderName::from_static("x-proxy-pod");
pub const X_PROXY_HOST: HeaderName = HeaderName::from_static("x-proxy-host");

/// Append every header in `src` to `dest`.
pub fn copy_headers(dest: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src.iter() {
        dest.append(name.clone(), value.clone());
    }
}

/// What the proxy knows about the caller's connection.
#[derive(Debug, Clone, Copy)]
pub struct ClientDetails<'a> {
    pub user_agent: Option<&'a HeaderValue>,
    pub local: Option<SocketAddr>,
    pub remote: SocketAddr,
}

/// Set the X-Proxied-Client-* headers.
pub fn add_client_headers(headers: &mut HeaderMap, client: ClientDetails<'_>) {
    let agent = client
        .user_agent
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(""));
    headers.insert(X_PROXIED_CLIENT_AGENT, agent);

    if let Some(local) = client.local {
        headers.insert(X_PROXIED_CLIENT_DESTINATION, addr_value(local));
    }

    headers.insert(X_PROXIED_CLIENT_SOURCE, addr_value(client.remote));
}

/// The caller's `User-Agent`, if it sent one.
pub fn user_agent(headers: &HeaderMap) -> Option<&HeaderValue> {
    headers.get(USER_AGENT)
}

fn addr_value(addr: SocketAddr) -> HeaderValue {
    // A formatted socket address is always visible ASCII.
    HeaderValue::try_from(addr.to_string()).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// X-Proxy-* headers, resolved once from the identity config.
#[derive(Debug, Clone, Default)]
pub struct IdentityHeaders {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl IdentityHeaders {
    /// Build the header set. Values that are not valid header text are
    /// skipped with a warning.
    pub fn from_config(identity: &IdentityConfig) -> Self {
        let candidates = [
            (X_PROXY_NODE, identity.node_name.as_deref()),
            (X_PROXY_POD, identity.pod_name.as_deref()),
            (X_PROXY_HOST, identity.hostname.as_deref()),
        ];

        let mut entries = Vec::new();
        for (name, value) in candidates {
            let Some(value) = value.filter(|v| !v.is_empty()) else {
                continue;
            };
            match HeaderValue::from_str(value) {
                Ok(v) => entries.push((name, v)),
                Err(_) => {
                    tracing::warn!(header = %name, value = %value, "Identity value is not a valid header value, skipping");
                }
            }
        }

        Self { entries }
    }

    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.entries {
            headers.insert(name.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
