//! Abstractions over the FAHClient command connection.
//!
//! The `Connector` trait lets the collector open connections either to a real
//! FAHClient over TCP or to an in-memory mock in tests.

use super::ClientError;
use super::types::{InfoSection, QueueInfo, SlotInfo};

/// Command that makes the client print its uptime, e.g. `14h 31m  2s`.
pub const UPTIME_COMMAND: &str = "eval \"$(uptime)\\n\"";

/// Command that makes the client print its clock as RFC 3339.
pub const DATE_COMMAND: &str = "eval \"$(date)\\n\"";

/// Queries supported by an open FAHClient connection.
///
/// The connection is closed when the value is dropped.
pub trait FahApi {
    /// Runs an arbitrary command and returns its text output.
    fn exec(&mut self, command: &str) -> Result<String, ClientError>;

    /// Fetches the `info` attribute tree.
    fn info(&mut self) -> Result<Vec<InfoSection>, ClientError>;

    /// Fetches the configured slots (`slot-info`).
    fn slot_info(&mut self) -> Result<Vec<SlotInfo>, ClientError>;

    /// Fetches the work-unit queue (`queue-info`).
    fn queue_info(&mut self) -> Result<Vec<QueueInfo>, ClientError>;
}

/// Opens connections to a FAHClient.
pub trait Connector: Send + Sync {
    type Connection: FahApi;

    /// Opens a new connection. Each poll opens its own.
    fn connect(&self) -> Result<Self::Connection, ClientError>;

    /// Address of the remote client, for logging.
    fn address(&self) -> &str;
}
