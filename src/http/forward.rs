//! The request forwarder.
//!
//! # State Machine
//! ```text
//! Received → Building → Dispatching → Succeeded
//!                │            ├──────→ TimedOut
//!                │            └──────→ DispatchFailed
//!                └───────────────────→ BuildFailed
//! ```
//! Every terminal state writes exactly one response. No state is revisited
//! and nothing is retried.
//!
//! # Concurrency
//! One `Forwarder` is shared by all request tasks. It holds the immutable
//! config behind an `Arc` and a cloneable client, so the request path needs
//! no locks. Dropping the future returned by [`Forwarder::forward`] (hyper
//! does this when the caller disconnects) drops the in-flight upstream call.
//! The same holds for the relayed body once streaming has started.
//!
//! # Deadline
//! One deadline covers the whole exchange. Expiry before the upstream head
//! arrives is a 504; expiry while the body streams cuts the body off.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Response;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::config::ProxyConfig;
use crate::http::headers::IdentityHeaders;
use crate::http::request::{self, InboundRequest};
use crate::http::response::{self, ErrorReport, ForwardError, ForwardOutcome};
use crate::resilience::Deadline;

/// Forwards requests to the configured upstream.
#[derive(Clone)]
pub struct Forwarder {
    config: Arc<ProxyConfig>,
    identity: Arc<IdentityHeaders>,
    client: Client<HttpConnector, Body>,
}

impl Forwarder {
    pub fn new(config: Arc<ProxyConfig>) -> Self {
        let identity = Arc::new(IdentityHeaders::from_config(&config.identity));
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            config,
            identity,
            client,
        }
    }

    /// The configuration this forwarder was built from.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Forward one request and produce the caller's response.
    pub async fn forward(&self, inbound: InboundRequest) -> (Response<Body>, ForwardOutcome) {
        tracing::info!(
            protocol = inbound.connection.protocol(),
            method = %inbound.method,
            uri = %inbound.uri,
            remote = %inbound.connection.remote,
            "Received request"
        );

        let target_url = request::target_url(&self.config.target, inbound.path());

        match self.execute(inbound, &target_url).await {
            Ok(response) => (response, ForwardOutcome::Succeeded),
            Err(err) => {
                let outcome = err.outcome();
                tracing::warn!(
                    target_url = %target_url,
                    outcome = outcome.as_str(),
                    error = %err,
                    "Forwarding failed"
                );
                let report = ErrorReport::new(&self.config, &target_url, err.to_string());
                (report.into_response(err.status()), outcome)
            }
        }
    }

    async fn execute(
        &self,
        inbound: InboundRequest,
        target_url: &str,
    ) -> Result<Response<Body>, ForwardError> {
        let deadline = Deadline::after(self.config.timeouts.request);
        let outbound = request::build_outbound(inbound, target_url, &self.identity)?;

        let upstream = deadline
            .run(self.client.request(outbound))
            .await
            .map_err(|_| ForwardError::Timeout)?
            .map_err(ForwardError::Dispatch)?;

        tracing::debug!(
            target_url = %target_url,
            status = %upstream.status(),
            "Upstream responded"
        );

        Ok(response::relay(upstream, &deadline))
    }
}
