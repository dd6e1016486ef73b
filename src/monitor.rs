use crate::config::Target;
use crate::connection::{self, ConnectionManager, JOIN_TIMEOUT};
use crate::error::Result;
use crate::presenter::{self, Presenter};
use crate::shutdown::Shutdown;
use crate::sink::MonitorSink;
use std::io::{self, Write};
use std::time::Duration;
use tokio::time;
use tracing::{info, warn};

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Runs the monitor until `shutdown` is triggered.
///
/// The listener task owns the connection and the presenter; this side only
/// polls for shutdown and joins the listener afterwards.
pub async fn run(target: &Target, shutdown: Shutdown) -> Result<()> {
    run_with(target, shutdown, io::stdout(), Presenter::new(io::stdout())).await
}

async fn run_with<W, S>(target: &Target, shutdown: Shutdown, mut console: W, sink: S) -> Result<()>
where
    W: Write,
    S: MonitorSink + 'static,
{
    presenter::write_banner(&mut console, target)?;

    let manager = ConnectionManager::configure(target.host.clone(), target.port);
    let listener = connection::start_async(manager, sink, shutdown.clone());

    // The listener is joined on every exit path, errors included.
    let result = supervise(&mut console, target, &shutdown).await;
    if !listener.shutdown(JOIN_TIMEOUT).await {
        warn!("Listener abandoned during shutdown");
    }
    result
}

async fn supervise<W: Write>(console: &mut W, target: &Target, shutdown: &Shutdown) -> Result<()> {
    presenter::write_started(console)?;
    info!(%target, "Monitor running");

    let mut poll = time::interval(POLL_INTERVAL);
    while !shutdown.is_triggered() {
        tokio::select! {
            _ = poll.tick() => {}
            _ = shutdown.triggered() => {}
        }
    }

    presenter::write_shutdown(console)?;
    Ok(())
}
