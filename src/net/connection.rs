//! Per-connection metadata.
//!
//! # Responsibilities
//! - Capture the peer and local socket addresses when a connection is accepted
//! - Record whether the connection carried TLS
//! - Hand that information to handlers as a typed `ConnectInfo`

use std::net::SocketAddr;

use axum::extract::connect_info::Connected;
use axum::serve::IncomingStream;
use tokio::net::TcpListener;

/// Addresses of an accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// The caller's address.
    pub remote: SocketAddr,
    /// The proxy-side address the caller connected to, when the socket reports it.
    pub local: Option<SocketAddr>,
    /// Whether the connection was TLS. Plain TCP listeners always report false.
    pub tls: bool,
}

impl ConnectionInfo {
    pub fn plain(remote: SocketAddr, local: Option<SocketAddr>) -> Self {
        Self {
            remote,
            local,
            tls: false,
        }
    }

    /// Protocol label used in request logs.
    pub fn protocol(&self) -> &'static str {
        if self.tls {
            "HTTPS"
        } else {
            "HTTP"
        }
    }
}

impl Connected<IncomingStream<'_, TcpListener>> for ConnectionInfo {
    fn connect_info(stream: IncomingStream<'_, TcpListener>) -> Self {
        let local = stream.io().local_addr().ok();
        Self::plain(*stream.remote_addr(), local)
    }
}
