//! Shutdown coordination for the proxy.
//!
//! A [`Shutdown`] is cloned into the signal listener (which triggers it) and
//! handed to the server as a future via [`Shutdown::signalled`].

use std::future::Future;

use tokio::sync::broadcast;

/// Fan-out stop signal. Cloning shares the same channel.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Resolves once [`trigger`](Self::trigger) is called or every handle
    /// is dropped. Registration happens here, not on first poll, so a
    /// trigger between this call and the first poll is not lost.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
