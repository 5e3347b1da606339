use tokio::sync::watch;
use tracing::{error, info};

/// Cooperative shutdown flag shared by the pipeline tasks.
///
/// The handler owns the sender side; tasks keep a [`ShutdownToken`] and
/// either poll `is_shutdown` or await `wait`.
pub struct ShutdownHandler {
    tx: watch::Sender<bool>,
}

#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl Default for ShutdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandler {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Spawns a task that triggers shutdown on SIGINT (Ctrl+C).
    pub fn install_signal_handler(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received SIGINT, initiating graceful shutdown");
                    let _ = tx.send(true);
                }
                Err(err) => {
                    error!("Failed to listen for SIGINT: {}", err);
                }
            }
        });
    }
}

impl ShutdownToken {
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    pub async fn wait(&mut self) {
        // Already triggered, or wait for the next change.
        if *self.rx.borrow() {
            return;
        }
        while self.rx.changed().await.is_ok() {
            if *self.rx.borrow() {
                return;
            }
        }
    }
}
