//! FAHClient command-server client.
//!
//! # Architecture
//!
//! ```text
//!          ┌──────────────────────────────┐
//!          │        Connector (trait)     │  one connect() per poll
//!          └──────────────┬───────────────┘
//!                         │
//!          ┌──────────────▼───────────────┐
//!          │        FahApi (trait)        │  exec / info / slot_info / queue_info
//!          └──────────────┬───────────────┘
//!                         │
//!            ┌────────────┴────────────┐
//!     ┌──────▼────────┐         ┌──────▼────────┐
//!     │ TcpConnection │         │ MockConnection│
//!     │ (port 36330)  │         │  (Testing)    │
//!     └──────┬────────┘         └───────────────┘
//!            │
//!     ┌──────▼────────┐
//!     │ PyON decoding │
//!     └───────────────┘
//! ```

pub mod mock;
pub mod pyon;
mod tcp;
pub mod traits;
pub mod types;

use std::time::Duration;

pub use mock::{MockConnection, MockConnector, Query};
pub use tcp::{TcpConnection, TcpConnector};
pub use traits::{Connector, DATE_COMMAND, FahApi, UPTIME_COMMAND};
pub use types::{InfoSection, QueueInfo, SlotInfo};

/// Default address of the FAHClient command server.
pub const DEFAULT_ADDRESS: &str = "localhost:36330";

/// Default timeout for connecting, reading and writing.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for FAHClient communication.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The connection could not be opened.
    Connect(String),
    /// Reading or writing the socket failed.
    Io(String),
    /// The server did not answer in time.
    Timeout(String),
    /// The reply was not framed as expected.
    Protocol(String),
    /// The reply body could not be decoded.
    Decode(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Connect(msg) => write!(f, "FAHClient: connection failed: {}", msg),
            ClientError::Io(msg) => write!(f, "FAHClient: I/O error: {}", msg),
            ClientError::Timeout(msg) => write!(f, "FAHClient: timed out: {}", msg),
            ClientError::Protocol(msg) => write!(f, "FAHClient: protocol error: {}", msg),
            ClientError::Decode(msg) => write!(f, "FAHClient: invalid reply: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Connection settings for the FAHClient.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// `host:port` of the command server.
    pub address: String,
    /// Applied to connect, every read and every write.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
