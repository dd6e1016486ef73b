// Custom Error Type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: rust_socketio::Error,
    },
    #[error("socket disconnect failed: {0}")]
    Disconnect(#[source] rust_socketio::Error),
    #[error("payload has no chip_data mapping")]
    MissingChipData,
    #[error("invalid {event} payload: {reason}")]
    InvalidPayload { event: &'static str, reason: String },
    #[error("frame rate payload must be 4 bytes, got {0}")]
    FrameRateLength(usize),
    #[error("signal handler error: {0}")]
    Signal(#[source] std::io::Error),
    #[error("console output error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
