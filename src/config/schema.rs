//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! Every field has a default so a bare environment still yields a usable
//! config that forwards to `localhost:8080`.

use std::time::Duration;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:80";
pub const DEFAULT_TARGET_HOST: &str = "localhost";
pub const DEFAULT_TARGET_PORT: &str = "8080";
pub const DEFAULT_PROXY_NODE_NAME: &str = "default-proxy-node";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Root configuration for the forwarding proxy.
///
/// Built once before the listener starts and shared read-only (behind an
/// `Arc`) with every request handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream every request is forwarded to.
    pub target: TargetConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Identity reported in augmentation headers and error reports.
    pub identity: IdentityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:80").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

/// Upstream target.
///
/// The port stays a string: a malformed value is only detected when a
/// request URL is built, and is reported to that caller as a 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub host: String,
    pub port: String,
}

impl TargetConfig {
    /// `host:port`, as shown in the error report.
    pub fn destination(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TARGET_HOST.to_string(),
            port: DEFAULT_TARGET_PORT.to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Deadline for the upstream to answer a forwarded request.
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Where this proxy instance runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Loaded from `PROXY_NODE_NAME` but never emitted; `node_name` is the
    /// value that reaches headers and reports.
    pub proxy_node_name: String,

    /// Emitted as `X-Proxy-Node` when set.
    pub node_name: Option<String>,

    /// Emitted as `X-Proxy-Pod` when set.
    pub pod_name: Option<String>,

    /// OS hostname, emitted as `X-Proxy-Host` when resolvable.
    pub hostname: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            proxy_node_name: DEFAULT_PROXY_NODE_NAME.to_string(),
            node_name: None,
            pod_name: None,
            hostname: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Prometheus exporter bind address. Metrics are not exported when unset.
    pub metrics_address: Option<String>,
}
