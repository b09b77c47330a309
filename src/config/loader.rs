//! Configuration loading from the process environment.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::config::schema::{
    IdentityConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, TargetConfig,
    TimeoutConfig, DEFAULT_PROXY_NODE_NAME, DEFAULT_TARGET_HOST, DEFAULT_TARGET_PORT,
};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Settings read from the environment, each also accepted as a flag.
///
/// Empty values count as unset, so `TARGET_PORT=` falls back to the default
/// the same way an absent variable does.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "forward-proxy", version)]
#[command(about = "Forward every HTTP request to a single upstream", long_about = None)]
pub struct ProxyArgs {
    /// Upstream host.
    #[arg(long, env = "TARGET_DESTINATION")]
    pub target_destination: Option<String>,

    /// Upstream port.
    #[arg(long, env = "TARGET_PORT")]
    pub target_port: Option<String>,

    #[arg(long, env = "PROXY_NODE_NAME")]
    pub proxy_node_name: Option<String>,

    /// Reported as X-Proxy-Node.
    #[arg(long, env = "NODE_NAME")]
    pub node_name: Option<String>,

    /// Reported as X-Proxy-Pod.
    #[arg(long, env = "POD_NAME")]
    pub pod_name: Option<String>,

    /// Address the proxy listens on.
    #[arg(long, env = "LISTEN_ADDRESS")]
    pub listen_address: Option<String>,

    /// Upstream deadline in milliseconds.
    #[arg(long, env = "REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Prometheus exporter address; metrics are off when unset.
    #[arg(long, env = "METRICS_ADDRESS")]
    pub metrics_address: Option<String>,
}

impl ProxyArgs {
    /// Resolve defaults and attach the OS hostname.
    pub fn into_config(self, hostname: Option<String>) -> ProxyConfig {
        let listener = match non_empty(self.listen_address) {
            Some(bind_address) => ListenerConfig { bind_address },
            None => ListenerConfig::default(),
        };

        let timeouts = match self.request_timeout_ms {
            Some(ms) => TimeoutConfig {
                request: Duration::from_millis(ms),
            },
            None => TimeoutConfig::default(),
        };

        ProxyConfig {
            listener,
            target: TargetConfig {
                host: non_empty(self.target_destination)
                    .unwrap_or_else(|| DEFAULT_TARGET_HOST.to_string()),
                port: non_empty(self.target_port)
                    .unwrap_or_else(|| DEFAULT_TARGET_PORT.to_string()),
            },
            timeouts,
            identity: IdentityConfig {
                proxy_node_name: non_empty(self.proxy_node_name)
                    .unwrap_or_else(|| DEFAULT_PROXY_NODE_NAME.to_string()),
                node_name: non_empty(self.node_name),
                pod_name: non_empty(self.pod_name),
                hostname: non_empty(hostname),
            },
            observability: ObservabilityConfig {
                metrics_address: non_empty(self.metrics_address),
            },
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Hostname of the machine, or `None` if the OS cannot report one.
pub fn resolve_hostname() -> Option<String> {
    match hostname::get() {
        Ok(name) => Some(name.to_string_lossy().into_owned()),
        Err(e) => {
            tracing::warn!(error = %e, "Could not resolve hostname");
            None
        }
    }
}

/// Read configuration from the environment and command line, then validate it.
pub fn load_from_env() -> Result<ProxyConfig, ConfigError> {
    let config = ProxyArgs::parse().into_config(resolve_hostname());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
