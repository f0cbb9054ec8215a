//! Graceful shutdown fan-out.
//!
//! One [`Shutdown`] per process (or per test server). Every server started
//! with [`Dispatcher::serve`](crate::Dispatcher::serve) holds a receiver and
//! stops accepting connections once the signal is sent.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::lifecycle::signals::shutdown_signal;

/// Broadcasts a single stop signal to every subscribed server.
pub struct Shutdown {
    /// Sending half; each server holds a receiver.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a coordinator with no subscribers yet.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver for one server; resolves when [`trigger`](Self::trigger) is called.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Tell every subscribed server to drain and stop. Idempotent.
    pub fn trigger(&self) {
        if self.tx.send(()).is_ok() {
            tracing::debug!(servers = self.tx.receiver_count(), "Shutdown signal sent");
        }
    }

    /// Servers still holding a receiver.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Trigger once SIGINT or SIGTERM arrives.
    pub fn trigger_on_signal(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            shutdown_signal().await;
            self.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
