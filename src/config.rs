use clap::Parser;
use std::fmt;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 27182;

/// Command line flags.
#[derive(Parser, Debug, Clone)]
#[command(name = "health-monitor", version, about = "Health Pod terminal monitor")]
pub struct Cli {
    /// IP address of the backend server.
    #[arg(long, default_value = DEFAULT_HOST)]
    pub ip: String,

    /// Port of the backend server.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Cli {
    pub fn target(&self) -> Target {
        Target::new(self.ip.clone(), self.port)
    }
}

/// Backend address the monitor connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Socket.IO endpoint, `http://<host>:<port>`.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
