//! Signal-driven cancellation.

use crate::error::Error;
use std::io;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cloneable shutdown request shared by the poll loop and the listener task.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn triggered(&self) {
        self.token.cancelled().await
    }
}

/// Waits for Ctrl-C or SIGTERM, then triggers `shutdown`.
///
/// A signal whose handler cannot be installed is logged and never fires; the
/// other one keeps working.
pub async fn listen_for_signals(shutdown: Shutdown) {
    let ctrl_c = wait_for("Ctrl+C", signal::ctrl_c());

    #[cfg(unix)]
    let terminate = wait_for("terminate", async {
        signal::unix::signal(signal::unix::SignalKind::terminate())?
            .recv()
            .await;
        Ok::<(), io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = shutdown.triggered() => return,
    }

    shutdown.trigger();
}

async fn wait_for<F>(name: &str, signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Received {name} signal"),
        Err(e) => {
            error!("{name} handler unavailable: {}", Error::Signal(e));
            std::future::pending::<()>().await
        }
    }
}
