//! Stopping the kiosk.
//!
//! The daemon has two subscribers: the [`KioskRunner`](crate::KioskRunner),
//! which tears the session down and abandons any verification in flight, and
//! the optional metrics server, which stops accepting scrapes. Both hold a
//! receiver from [`ShutdownController::subscribe`].

use std::fmt;

use tokio::signal;
use tokio::sync::broadcast;

/// Why the kiosk is stopping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        })
    }
}

pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify every subscriber. Returns how many were listening.
    pub fn shutdown(&self) -> usize {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::debug!(notified, "shutdown broadcast");
        notified
    }

    /// Wait for SIGINT or SIGTERM, then notify subscribers.
    pub async fn wait_for_signal(&self) -> std::io::Result<ShutdownReason> {
        #[cfg(unix)]
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        #[cfg(unix)]
        let terminate = terminate.recv();
        #[cfg(not(unix))]
        let terminate = std::future::pending::<Option<()>>();

        let reason = tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                ShutdownReason::Interrupt
            }
            _ = terminate => ShutdownReason::Terminate,
        };

        tracing::info!(signal = %reason, "stopping entry kiosk");
        self.shutdown();
        Ok(reason)
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
