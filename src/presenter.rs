//! Console rendering of monitor events.

use crate::config::Target;
use crate::event::Reading;
use crate::sink::MonitorSink;
use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tracing::warn;

/// Minimum spacing between two printed FPS values.
pub const FPS_PRINT_INTERVAL: Duration = Duration::from_secs(5);

const RULE_WIDTH: usize = 50;

pub fn write_banner<W: Write>(out: &mut W, target: &Target) -> io::Result<()> {
    writeln!(out, "🏥 Health Pod Terminal Monitor")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "Connecting to backend at {target}...")?;
    out.flush()
}

pub fn write_started<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "✅ Socket service started")?;
    writeln!(out, "📊 Waiting for measurements...")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    out.flush()
}

pub fn write_shutdown<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n\n🛑 Shutting down terminal monitor...")?;
    out.flush()
}

pub struct Presenter<W> {
    out: W,
    last_measurement_time: Option<DateTime<Local>>,
    last_fps_print: Option<Instant>,
    fps_interval: Duration,
}

impl<W: Write> Presenter<W> {
    pub fn new(out: W) -> Self {
        Self::with_fps_interval(out, FPS_PRINT_INTERVAL)
    }

    pub fn with_fps_interval(out: W, fps_interval: Duration) -> Self {
        Self {
            out,
            last_measurement_time: None,
            last_fps_print: None,
            fps_interval,
        }
    }

    pub fn last_measurement_time(&self) -> Option<DateTime<Local>> {
        self.last_measurement_time
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_measurements(
        &mut self,
        heart_rate: Reading,
        resp_rate: Reading,
        at: DateTime<Local>,
    ) -> io::Result<()> {
        self.last_measurement_time = Some(at);

        writeln!(
            self.out,
            "\n📈 New Measurements [{}]",
            at.format("%Y-%m-%d %H:%M:%S")
        )?;
        if let Some(value) = display_reading(heart_rate, "BPM") {
            writeln!(self.out, "   ❤️  Heart Rate: {value}")?;
        }
        if let Some(value) = display_reading(resp_rate, "breaths/min") {
            writeln!(self.out, "   🫁 Respiratory Rate: {value}")?;
        }
        writeln!(self.out, "{}", "-".repeat(RULE_WIDTH))?;
        self.out.flush()
    }

    /// Prints `fps` unless the previous print was less than the interval ago.
    /// Returns whether a line was written.
    fn render_fps(&mut self, fps: f32, now: Instant) -> io::Result<bool> {
        let due = self
            .last_fps_print
            .is_none_or(|last| now.saturating_duration_since(last) >= self.fps_interval);
        if !due {
            return Ok(false);
        }
        writeln!(self.out, "📹 FPS: {fps:.1}")?;
        self.out.flush()?;
        self.last_fps_print = Some(now);
        Ok(true)
    }

    fn render_line(&mut self, line: std::fmt::Arguments<'_>) -> io::Result<()> {
        self.out.write_fmt(line)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

/// Rounded reading with its unit, or `None` for the sentinel.
fn display_reading(reading: Reading, unit: &str) -> Option<String> {
    match reading {
        Reading::Value(v) => Some(format!("{} {unit}", v.round_ties_even() as i64)),
        Reading::Unavailable => None,
        Reading::Missing => Some("N/A".to_string()),
    }
}

fn report(result: io::Result<()>) {
    if let Err(e) = result {
        warn!("Error writing to console: {e}");
    }
}

impl<W: Write + Send> MonitorSink for Presenter<W> {
    // Temperature and imagery have no terminal rendering.
    fn on_measurements(
        &mut self,
        heart_rate: Reading,
        resp_rate: Reading,
        _temperature: Reading,
        _image: Option<&[u8]>,
    ) {
        report(self.render_measurements(heart_rate, resp_rate, Local::now()));
    }

    fn on_fps(&mut self, fps: f32) {
        report(self.render_fps(fps, Instant::now()).map(|_| ()));
    }

    fn on_connection_status(&mut self, host: &str) {
        report(self.render_line(format_args!("🔗 Connected to backend: {host}")));
    }

    fn on_face_detected(&mut self, face_id: Option<&str>) {
        let result = match face_id {
            None => self.render_line(format_args!("👤 No person detected")),
            Some(id) => self.render_line(format_args!("👤 Person detected (ID: {id})")),
        };
        report(result);
    }

    fn on_disconnected(&mut self) {
        report(self.render_line(format_args!("🔌 Disconnected from backend")));
    }
}
