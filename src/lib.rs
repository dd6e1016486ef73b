pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod monitor;
pub mod presenter;
pub mod shutdown;
pub mod sink;

pub use config::{Cli, Target};
pub use connection::{ConnectionManager, Delivery, Listener, start_async};
pub use error::{Error, Result};
pub use event::{EventKind, Measurement, Reading, WireEvent};
pub use presenter::Presenter;
pub use shutdown::Shutdown;
pub use sink::MonitorSink;
