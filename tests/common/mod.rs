//! Shared utilities for integration tests: mock upstreams and a proxy launcher.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, Uri};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use forward_proxy::config::ProxyConfig;
use forward_proxy::http::HttpServer;
use forward_proxy::lifecycle::Shutdown;

async fn bind_local() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Read until the end of the request head; the mocks never need the body.
async fn read_head(socket: &mut tokio::net::TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
}

/// Upstream that answers every connection with the same raw HTTP response.
/// Returns its address and a counter of accepted connections.
pub async fn start_raw_backend(response: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    let (listener, addr) = bind_local().await;
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                read_head(&mut socket).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, hits)
}

/// Upstream returning `200 hello` with an `X-Foo: bar` header.
pub async fn start_hello_backend() -> (SocketAddr, Arc<AtomicUsize>) {
    start_raw_backend(
        "HTTP/1.1 200 OK\r\nX-Foo: bar\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
    )
    .await
}

/// Upstream that reflects the request it received as plain text:
/// `METHOD URI` on the first line, then one `name: value` line per header
/// value in received order, a blank line, and the request body.
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> String {
        let mut text = format!("{} {}\n", method, uri);
        for (name, value) in headers.iter() {
            text.push_str(&format!(
                "{}: {}\n",
                name,
                String::from_utf8_lossy(value.as_bytes())
            ));
        }
        text.push('\n');
        text.push_str(&String::from_utf8_lossy(&body));
        text
    }

    let (listener, addr) = bind_local().await;
    let app = Router::new().fallback(echo);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Upstream that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let (listener, addr) = bind_local().await;
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// Upstream that reads the request and drops the connection without a reply.
pub async fn start_resetting_backend() -> SocketAddr {
    let (listener, addr) = bind_local().await;
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            read_head(&mut socket).await;
            drop(socket);
        }
    });
    addr
}

/// Upstream that sends its head and the first two of ten body bytes at
/// once, then one more byte every `interval`.
pub async fn start_trickling_backend(interval: Duration) -> SocketAddr {
    let (listener, addr) = bind_local().await;
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_head(&mut socket).await;
                let head = "HTTP/1.1 200 OK\r\nContent-Length: 10\r\nConnection: close\r\n\r\nab";
                if socket.write_all(head.as_bytes()).await.is_err() {
                    return;
                }
                for byte in b"cdefghij" {
                    tokio::time::sleep(interval).await;
                    if socket.write_all(&[*byte]).await.is_err() {
                        return;
                    }
                }
            });
        }
    });
    addr
}

/// What a [`start_watching_backend`] upstream observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamEvent {
    RequestArrived,
    ConnectionClosed,
}

/// Upstream that never answers and reports when a request arrives and when
/// the proxy closes the connection.
pub async fn start_watching_backend() -> (SocketAddr, mpsc::UnboundedReceiver<UpstreamEvent>) {
    let (listener, addr) = bind_local().await;
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                read_head(&mut socket).await;
                let _ = tx.send(UpstreamEvent::RequestArrived);
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
                let _ = tx.send(UpstreamEvent::ConnectionClosed);
            });
        }
    });
    (addr, rx)
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let (listener, addr) = bind_local().await;
    drop(listener);
    addr
}

/// Config forwarding to `upstream` with no identity values set.
pub fn config_for(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.target.host = upstream.ip().to_string();
    config.target.port = upstream.port().to_string();
    config
}

/// A running proxy instance.
pub struct TestProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the proxy on an ephemeral port.
pub async fn spawn_proxy(config: ProxyConfig) -> TestProxy {
    let (listener, addr) = bind_local().await;
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.signalled();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy { addr, shutdown }
}

/// Test client: no system proxy, no connection reuse.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Header lines (`name: value`) of an echoed request.
pub fn echoed_headers(echo: &str) -> Vec<&str> {
    echo.lines()
        .skip(1)
        .take_while(|line| !line.is_empty())
        .collect()
}

/// Values of one header in an echoed request, in received order.
pub fn echoed_values<'a>(echo: &'a str, name: &str) -> Vec<&'a str> {
    let prefix = format!("{}: ", name.to_ascii_lowercase());
    echoed_headers(echo)
        .into_iter()
        .filter_map(|line| line.strip_prefix(prefix.as_str()))
        .collect()
}
