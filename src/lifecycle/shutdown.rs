//! Stop signal shared by the signal listener and the HTTP server.
//!
//! `main` hands a clone to [`signals::spawn_signal_listener`](super::signals::spawn_signal_listener),
//! which triggers it, and a receiver to the server, whose graceful shutdown waits on it.
//! Transfers already past broadcast finish on their own tasks.

use tokio::sync::broadcast;

/// Handle that stops the gateway's listener.
///
/// Any clone may trigger. The server's graceful-shutdown future holds the receiving
/// side and resolves on the first trigger, or once every handle is dropped.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver for a listener that must stop on shutdown.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask the gateway to stop. Returns how many listeners were told.
    pub fn trigger(&self) -> usize {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::info!(listeners = notified, "Gateway shutdown requested");
        notified
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Graceful-shutdown future for the HTTP server: stop accepting, then drain.
pub async fn wait_for(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
    tracing::info!("Draining in-flight requests");
}
