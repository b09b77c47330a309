//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all route
//! - Wire up middleware (tracing)
//! - Serve on a bound listener with per-connection address info
//! - Hand each request to the forwarder and record metrics

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::forward::Forwarder;
use crate::http::request::InboundRequest;
use crate::net::ConnectionInfo;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    forwarder: Forwarder,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            forwarder: Forwarder::new(Arc::new(config)),
        }
    }

    /// Every method and path goes to the same handler.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<S>(self, listener: TcpListener, shutdown: S) -> Result<(), std::io::Error>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        let config = self.forwarder.config();
        tracing::info!(
            address = %addr,
            target = %config.target.destination(),
            request_timeout_ms = config.timeouts.request.as_millis() as u64,
            "HTTP server starting"
        );

        let app = Self::build_router(AppState {
            forwarder: self.forwarder,
        })
        .into_make_service_with_connect_info::<ConnectionInfo>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(connection): ConnectInfo<ConnectionInfo>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    let inbound = InboundRequest::from_request(request, connection);
    let (response, outcome) = state.forwarder.forward(inbound).await;

    metrics::record_request(&method, response.status(), outcome, start);
    response
}
