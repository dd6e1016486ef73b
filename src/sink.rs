use crate::event::Reading;

/// Receiver of decoded backend events.
///
/// The connection layer only ever talks to this trait. Calls arrive on the
/// listener task, one at a time, in wire order.
pub trait MonitorSink: Send {
    fn on_measurements(
        &mut self,
        heart_rate: Reading,
        resp_rate: Reading,
        temperature: Reading,
        image: Option<&[u8]>,
    );

    fn on_fps(&mut self, fps: f32);

    fn on_connection_status(&mut self, host: &str);

    fn on_face_detected(&mut self, face_id: Option<&str>);

    fn on_disconnected(&mut self);

    fn on_feed(&mut self) {}

    fn on_thermal_image(&mut self) {}
}
