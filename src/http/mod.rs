//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all route, connection info)
//!     → request.rs (inbound request, target URL, outbound request)
//!     → headers.rs (copy + X-Proxied-Client-* / X-Proxy-* headers)
//!     → forward.rs (deadline-bounded dispatch to the upstream)
//!     → response.rs (relay upstream response, or error report)
//!     → Send to client
//! ```

pub mod forward;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use forward::Forwarder;
pub use request::InboundRequest;
pub use response::{ErrorReport, ForwardError, ForwardOutcome};
pub use server::HttpServer;
