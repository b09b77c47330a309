//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind the configured address)
//!     → connection.rs (capture remote/local addresses, TLS flag)
//!     → Hand off to HTTP layer as ConnectInfo<ConnectionInfo>
//! ```
//!
//! # Design Decisions
//! - No TLS termination; the TLS flag exists so logs can tell protocols apart
//! - Connection metadata is captured at accept time, not looked up per request

pub mod connection;
pub mod listener;

pub use connection::ConnectionInfo;
pub use listener::{bind, ListenerError};
