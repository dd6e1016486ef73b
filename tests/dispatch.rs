use health_monitor::connection::{EVENT_QUEUE_DEPTH, forward, forward_after_connect};
use health_monitor::{Delivery, EventKind, MonitorSink, Presenter, Reading, Shutdown, WireEvent};
use rust_socketio::Payload;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
struct RecordingSink {
    calls: Vec<String>,
}

impl MonitorSink for RecordingSink {
    fn on_measurements(
        &mut self,
        heart_rate: Reading,
        resp_rate: Reading,
        _temperature: Reading,
        image: Option<&[u8]>,
    ) {
        self.calls.push(format!(
            "measurements {heart_rate:?} {resp_rate:?} image={}",
            image.map_or(0, <[u8]>::len)
        ));
    }

    fn on_fps(&mut self, fps: f32) {
        self.calls.push(format!("fps {fps:.1}"));
    }

    fn on_connection_status(&mut self, host: &str) {
        self.calls.push(format!("connected {host}"));
    }

    fn on_face_detected(&mut self, face_id: Option<&str>) {
        self.calls.push(format!("face {face_id:?}"));
    }

    fn on_disconnected(&mut self) {
        self.calls.push("disconnected".into());
    }

    fn on_feed(&mut self) {
        self.calls.push("feed".into());
    }

    fn on_thermal_image(&mut self) {
        self.calls.push("thermal".into());
    }
}

fn chip(heart_rate: f64, resp_rate: f64) -> Payload {
    Payload::Text(vec![json!({
        "chip_data": { "temp": 36.5, "heartrate": heart_rate, "resprate": resp_rate }
    })])
}

/// Decodes like the socket handlers do: bad payloads are dropped, the rest queued.
async fn push(tx: &mpsc::Sender<Delivery>, kind: EventKind, payload: Payload) {
    if let Ok(event) = WireEvent::decode(kind, &payload) {
        tx.send(Delivery::Event(event)).await.unwrap();
    }
}

#[tokio::test]
async fn delivers_in_arrival_order() {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    push(&tx, EventKind::AddChip, chip(72.0, 14.0)).await;
    push(&tx, EventKind::UpdateFeed, Payload::Binary(vec![0; 32].into())).await;
    push(&tx, EventKind::FrameRate, Payload::Binary(3.14f32.to_ne_bytes().to_vec().into())).await;
    push(&tx, EventKind::ThermalImage, Payload::Binary(vec![0; 32].into())).await;
    push(&tx, EventKind::UpdateChip, chip(-1.0, 12.0)).await;
    tx.send(Delivery::Closed).await.unwrap();
    drop(tx);

    let mut sink = RecordingSink::default();
    forward(rx, &mut sink, &Shutdown::new()).await;

    assert_eq!(
        sink.calls,
        [
            "measurements Value(72.0) Value(14.0) image=0",
            "feed",
            "fps 3.1",
            "thermal",
            "measurements Unavailable Value(12.0) image=0",
            "disconnected",
        ]
    );
}

#[tokio::test]
async fn connection_status_precedes_events_queued_during_handshake() {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    push(&tx, EventKind::AddChip, chip(70.0, 12.0)).await;
    push(&tx, EventKind::FrameRate, Payload::Binary(24.0f32.to_ne_bytes().to_vec().into())).await;
    drop(tx);

    let mut sink = RecordingSink::default();
    forward_after_connect("10.0.0.5", rx, &mut sink, &Shutdown::new()).await;

    assert_eq!(
        sink.calls,
        [
            "connected 10.0.0.5",
            "measurements Value(70.0) Value(12.0) image=0",
            "fps 24.0",
        ]
    );
}

#[tokio::test]
async fn malformed_payloads_do_not_stop_delivery() {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    push(&tx, EventKind::UpdateChip, Payload::Text(vec![json!({ "temp": 36.5 })])).await;
    push(&tx, EventKind::FrameRate, Payload::Binary(vec![1, 2].into())).await;
    push(&tx, EventKind::UpdateChip, chip(65.0, 13.0)).await;
    drop(tx);

    let mut sink = RecordingSink::default();
    forward(rx, &mut sink, &Shutdown::new()).await;

    assert_eq!(sink.calls, ["measurements Value(65.0) Value(13.0) image=0"]);
}

#[tokio::test]
async fn shutdown_stops_forwarding_with_senders_alive() {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let shutdown = Shutdown::new();

    let task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            let mut sink = RecordingSink::default();
            forward(rx, &mut sink, &shutdown).await;
            sink
        }
    });

    push(&tx, EventKind::FrameRate, Payload::Binary(30.0f32.to_ne_bytes().to_vec().into())).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.trigger();

    let sink = tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sink.calls, ["fps 30.0"]);
    drop(tx);
}

#[tokio::test]
async fn presenter_renders_forwarded_events() {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    push(&tx, EventKind::AddChip, chip(80.4, -1.0)).await;
    push(&tx, EventKind::FrameRate, Payload::Binary(25.0f32.to_ne_bytes().to_vec().into())).await;
    push(&tx, EventKind::FrameRate, Payload::Binary(26.0f32.to_ne_bytes().to_vec().into())).await;
    drop(tx);

    let mut presenter = Presenter::new(Vec::new());
    forward(rx, &mut presenter, &Shutdown::new()).await;
    let out = String::from_utf8(presenter.into_inner()).unwrap();

    assert!(out.contains("❤️  Heart Rate: 80 BPM"));
    assert!(!out.contains("Respiratory Rate"));
    assert!(out.contains("📹 FPS: 25.0"));
    // Second frame rate lands inside the throttle window.
    assert!(!out.contains("26.0"));
}
