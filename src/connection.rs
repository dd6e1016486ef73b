//! Socket.IO connection to the backend and the listener task that feeds a
//! [`MonitorSink`].
//!
//! Every failure here is logged and swallowed. A failed connect leaves the
//! manager disconnected; nothing retries.

use crate::config::Target;
use crate::error::{Error, Result};
use crate::event::{EventKind, WireEvent};
use crate::shutdown::Shutdown;
use crate::sink::MonitorSink;
use futures::FutureExt;
use futures::future::BoxFuture;
use rust_socketio::asynchronous::{Client, ClientBuilder};
use rust_socketio::{Event, Payload};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

// Constants
pub const EVENT_QUEUE_DEPTH: usize = 100;
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(3);

/// What the listener hands to the sink.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Event(WireEvent),
    Closed,
}

impl Delivery {
    pub fn deliver<S: MonitorSink + ?Sized>(self, sink: &mut S) {
        match self {
            Delivery::Closed => sink.on_disconnected(),
            Delivery::Event(WireEvent::AddChip(m) | WireEvent::UpdateChip(m)) => {
                sink.on_measurements(m.heart_rate, m.resp_rate, m.temperature, m.image.as_deref())
            }
            Delivery::Event(WireEvent::FrameRate(fps)) => sink.on_fps(fps),
            Delivery::Event(WireEvent::UpdateFeed) => sink.on_feed(),
            Delivery::Event(WireEvent::ThermalImage) => sink.on_thermal_image(),
        }
    }
}

pub struct ConnectionManager {
    target: Target,
    client: Option<Client>,
}

impl ConnectionManager {
    /// Stores the backend address. No I/O happens until [`connect`](Self::connect).
    pub fn configure(host: impl Into<String>, port: u16) -> Self {
        Self {
            target: Target::new(host, port),
            client: None,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Opens the connection and binds the backend events to `events`.
    /// Failures are logged, not returned; check [`is_connected`](Self::is_connected).
    ///
    /// Handlers are live before this returns, so events may already be queued
    /// when it does. The connection status is announced by the listener.
    pub async fn connect(&mut self, events: &mpsc::Sender<Delivery>) {
        if let Err(e) = self.try_connect(events).await {
            error!("Error setting up socket connection: {e}");
        }
    }

    async fn try_connect(&mut self, events: &mpsc::Sender<Delivery>) -> Result<()> {
        if self.is_connected() {
            self.disconnect().await;
        }

        let url = self.target.url();
        info!(url = %url, "Connecting to backend");

        let mut builder = ClientBuilder::new(url.as_str());
        for kind in EventKind::ALL {
            builder = builder.on(kind.name(), event_handler(kind, events.clone()));
        }
        let closed = events.clone();
        builder = builder
            .on(Event::Error, |payload, _| {
                async move { warn!(?payload, "Socket error") }.boxed()
            })
            .on(Event::Close, move |_, _| {
                let closed = closed.clone();
                async move {
                    // The listener may already be gone during shutdown.
                    let _ = closed.try_send(Delivery::Closed);
                }
                .boxed()
            });

        let client = builder
            .connect()
            .await
            .map_err(|source| Error::Connect { url, source })?;
        self.client = Some(client);
        Ok(())
    }

    /// Closes the connection if one is open. Safe to call at any time.
    pub async fn disconnect(&mut self) {
        let Some(client) = self.client.take() else {
            debug!("Disconnect requested while not connected");
            return;
        };
        if let Err(e) = client.disconnect().await.map_err(Error::Disconnect) {
            error!("Error disconnecting socket: {e}");
        }
    }
}

fn event_handler(
    kind: EventKind,
    events: mpsc::Sender<Delivery>,
) -> impl FnMut(Payload, Client) -> BoxFuture<'static, ()> + Send + Sync + 'static {
    move |payload, _socket| {
        let events = events.clone();
        async move {
            match WireEvent::decode(kind, &payload) {
                Ok(event) => {
                    if events.send(Delivery::Event(event)).await.is_err() {
                        debug!(event = kind.name(), "Listener closed, dropping event");
                    }
                }
                Err(e) => error!("Error handling {}: {e}", kind.name()),
            }
        }
        .boxed()
    }
}

/// Handle to the background listener task.
pub struct Listener {
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl Listener {
    /// Requests shutdown and waits up to `timeout` for the task to disconnect
    /// and exit. Returns `false` if the task had to be abandoned.
    pub async fn shutdown(mut self, timeout: Duration) -> bool {
        self.shutdown.trigger();
        match tokio::time::timeout(timeout, &mut self.handle).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!("Listener task failed: {e}");
                false
            }
            Err(_) => {
                warn!(?timeout, "Listener did not stop in time, aborting");
                self.handle.abort();
                false
            }
        }
    }
}

/// Connects on a background task so the caller is never blocked.
pub fn start_async<S>(manager: ConnectionManager, sink: S, shutdown: Shutdown) -> Listener
where
    S: MonitorSink + 'static,
{
    let handle = tokio::spawn(listen(manager, sink, shutdown.clone()));
    Listener { shutdown, handle }
}

async fn listen<S: MonitorSink>(mut manager: ConnectionManager, mut sink: S, shutdown: Shutdown) {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);

    tokio::select! {
        _ = manager.connect(&tx) => {}
        _ = shutdown.triggered() => {
            debug!("Shutdown requested while connecting");
            return;
        }
    }
    drop(tx);

    if !manager.is_connected() {
        return;
    }

    let host = manager.target().host.clone();
    forward_after_connect(&host, rx, &mut sink, &shutdown).await;
    manager.disconnect().await;
}

/// Announces the connection, then forwards whatever the handlers queued,
/// including events that arrived during the handshake.
pub async fn forward_after_connect<S: MonitorSink + ?Sized>(
    host: &str,
    rx: mpsc::Receiver<Delivery>,
    sink: &mut S,
    shutdown: &Shutdown,
) {
    sink.on_connection_status(host);
    forward(rx, sink, shutdown).await;
}

/// Hands deliveries to `sink` in arrival order until shutdown or until every
/// sender is gone.
pub async fn forward<S: MonitorSink + ?Sized>(
    mut rx: mpsc::Receiver<Delivery>,
    sink: &mut S,
    shutdown: &Shutdown,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.triggered() => break,
            next = rx.recv() => match next {
                Some(delivery) => delivery.deliver(sink),
                None => break,
            },
        }
    }
}
