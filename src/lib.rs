//! Forwarding HTTP proxy library.
//!
//! Every inbound request is relayed to one statically configured upstream
//! `host:port`, annotated with headers describing the caller and this proxy
//! instance. Failures are answered with a plaintext diagnostic report.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
