//! Interrupt handling
//!
//! Handlers are registered by [`ShutdownSignal::install`], not on first poll,
//! so an interrupt that arrives while the graph is still being built or
//! started is queued and stops playback as soon as the event loop runs.

use std::io;
use tracing::info;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Installed Ctrl+C and SIGTERM handlers
pub struct ShutdownSignal {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
}

impl ShutdownSignal {
    /// Register the handlers now; must be called inside a tokio runtime
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            interrupt: signal(SignalKind::interrupt())?,
            #[cfg(unix)]
            terminate: signal(SignalKind::terminate())?,
            #[cfg(windows)]
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    /// Completes on the first signal received since [`install`](Self::install)
    #[cfg(unix)]
    pub async fn recv(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {
                info!("Received Ctrl+C, stopping playback");
            },
            _ = self.terminate.recv() => {
                info!("Received terminate signal, stopping playback");
            },
        }
    }

    #[cfg(windows)]
    pub async fn recv(mut self) {
        self.ctrl_c.recv().await;
        info!("Received Ctrl+C, stopping playback");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_before_wait_is_not_lost() {
        let shutdown = ShutdownSignal::install().unwrap();

        // Delivered before anything awaits the handler
        let status = Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());
        tokio::time::sleep(Duration::from_millis(50)).await;

        tokio::time::timeout(Duration::from_secs(5), shutdown.recv())
            .await
            .expect("queued SIGTERM was not observed");
    }
}
