//! Forwarding HTTP proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                FORWARD PROXY                 │
//!     Client Request       │  ┌─────────┐    ┌─────────┐    ┌──────────┐  │
//!     ─────────────────────┼─▶│   net   │───▶│  http   │───▶│ forward  │──┼──▶ Upstream
//!                          │  │listener │    │ server  │    │ deadline │  │   host:port
//!                          │  └─────────┘    └─────────┘    └────┬─────┘  │
//!     Client Response      │                                     │        │
//!     ◀────────────────────┼───────── relay / error report ◀─────┘        │
//!                          │                                              │
//!                          │  config (env, immutable) · observability     │
//!                          │  lifecycle (signals, graceful shutdown)      │
//!                          └──────────────────────────────────────────────┘
//! ```

use forward_proxy::config;
use forward_proxy::http::HttpServer;
use forward_proxy::lifecycle::{signals, Shutdown};
use forward_proxy::net;
use forward_proxy::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    tracing::info!("forward-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let config = config::load_from_env()?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        target = %config.target.destination(),
        request_timeout_ms = config.timeouts.request.as_millis() as u64,
        node_name = config.identity.node_name.as_deref().unwrap_or(""),
        pod_name = config.identity.pod_name.as_deref().unwrap_or(""),
        hostname = config.identity.hostname.as_deref().unwrap_or(""),
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        // Already validated as a socket address.
        if let Ok(addr) = addr.parse() {
            if let Err(e) = metrics::init_metrics(addr) {
                tracing::error!(error = %e, "Failed to start metrics exporter");
            }
        }
    }

    let listener = match net::bind(&config.listener).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "HTTP server failed");
            return Ok(());
        }
    };

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config);
    if let Err(e) = server.run(listener, shutdown.signalled()).await {
        tracing::error!(error = %e, "HTTP server failed");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
