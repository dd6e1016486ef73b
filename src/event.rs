//! Typed view of the backend's Socket.IO events.
//!
//! Payloads are decoded here, at the boundary, so nothing downstream ever
//! looks at a raw JSON mapping or byte buffer.

use crate::error::{Error, Result};
use rust_socketio::Payload;
use serde_json::Value;

/// Marker the backend sends for a reading it cannot currently produce.
pub const UNAVAILABLE_SENTINEL: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    AddChip,
    UpdateChip,
    UpdateFeed,
    FrameRate,
    ThermalImage,
}

impl EventKind {
    /// Every event the monitor binds, in registration order.
    pub const ALL: [EventKind; 5] = [
        EventKind::AddChip,
        EventKind::UpdateChip,
        EventKind::UpdateFeed,
        EventKind::FrameRate,
        EventKind::ThermalImage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::AddChip => "add_chip",
            EventKind::UpdateChip => "update_chip",
            EventKind::UpdateFeed => "update_feed",
            EventKind::FrameRate => "frame_rate",
            EventKind::ThermalImage => "thermal_image",
        }
    }
}

/// One raw chip field as it came off the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Value(f64),
    /// The `-1` sentinel.
    Unavailable,
    /// Absent or not a number; shown as `N/A`.
    Missing,
}

impl Reading {
    fn from_json(value: Option<&Value>) -> Self {
        let number = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(v) if v == UNAVAILABLE_SENTINEL => Reading::Unavailable,
            Some(v) if v.is_finite() => Reading::Value(v),
            _ => Reading::Missing,
        }
    }
}

/// Chip data for one measurement cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub heart_rate: Reading,
    pub resp_rate: Reading,
    pub temperature: Reading,
    pub image: Option<Vec<u8>>,
}

impl Measurement {
    /// Extracts the nested `chip_data` mapping from an event argument.
    pub fn from_json(data: &Value) -> Result<Self> {
        let chip = data
            .get("chip_data")
            .and_then(Value::as_object)
            .ok_or(Error::MissingChipData)?;

        Ok(Self {
            heart_rate: Reading::from_json(chip.get("heartrate")),
            resp_rate: Reading::from_json(chip.get("resprate")),
            temperature: Reading::from_json(chip.get("temp")),
            image: chip.get("chip_img").and_then(image_bytes),
        })
    }
}

fn image_bytes(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::String(s) => Some(s.as_bytes().to_vec()),
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect(),
        _ => None,
    }
}

/// Reads a native-endian IEEE-754 single from exactly four bytes.
pub fn decode_frame_rate(data: &[u8]) -> Result<f32> {
    let raw: [u8; 4] = data
        .try_into()
        .map_err(|_| Error::FrameRateLength(data.len()))?;
    Ok(f32::from_ne_bytes(raw))
}

#[derive(Debug, Clone, PartialEq)]
pub enum WireEvent {
    AddChip(Measurement),
    UpdateChip(Measurement),
    UpdateFeed,
    FrameRate(f32),
    ThermalImage,
}

impl WireEvent {
    pub fn decode(kind: EventKind, payload: &Payload) -> Result<Self> {
        match kind {
            EventKind::AddChip => Ok(WireEvent::AddChip(measurement(kind, payload)?)),
            EventKind::UpdateChip => Ok(WireEvent::UpdateChip(measurement(kind, payload)?)),
            EventKind::FrameRate => match payload {
                Payload::Binary(data) => Ok(WireEvent::FrameRate(decode_frame_rate(data)?)),
                _ => Err(Error::InvalidPayload {
                    event: kind.name(),
                    reason: "expected binary payload".into(),
                }),
            },
            // Video and thermal frames have no terminal rendering.
            EventKind::UpdateFeed => Ok(WireEvent::UpdateFeed),
            EventKind::ThermalImage => Ok(WireEvent::ThermalImage),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            WireEvent::AddChip(_) => EventKind::AddChip,
            WireEvent::UpdateChip(_) => EventKind::UpdateChip,
            WireEvent::UpdateFeed => EventKind::UpdateFeed,
            WireEvent::FrameRate(_) => EventKind::FrameRate,
            WireEvent::ThermalImage => EventKind::ThermalImage,
        }
    }
}

fn measurement(kind: EventKind, payload: &Payload) -> Result<Measurement> {
    match payload {
        Payload::Text(args) => {
            let data = args.first().ok_or_else(|| Error::InvalidPayload {
                event: kind.name(),
                reason: "no event arguments".into(),
            })?;
            Measurement::from_json(data)
        }
        _ => Err(Error::InvalidPayload {
            event: kind.name(),
            reason: "expected JSON payload".into(),
        }),
    }
}
