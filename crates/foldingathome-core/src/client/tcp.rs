//! TCP connection to the FAHClient command server.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, trace};

use super::pyon;
use super::traits::{Connector, FahApi};
use super::types::{InfoSection, QueueInfo, SlotInfo};
use super::{ClientConfig, ClientError};

/// Prompt printed by the server when it is ready for the next command.
const PROMPT: &[u8] = b"> ";

/// Upper bound for a single reply; guards against a peer that never prompts.
const MAX_REPLY_BYTES: usize = 4 * 1024 * 1024;

/// Opens TCP connections to a FAHClient.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    config: ClientConfig,
}

impl TcpConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl Connector for TcpConnector {
    type Connection = TcpConnection;

    fn connect(&self) -> Result<TcpConnection, ClientError> {
        TcpConnection::open(&self.config)
    }

    fn address(&self) -> &str {
        &self.config.address
    }
}

/// An open command-server session. Closed on drop.
pub struct TcpConnection {
    stream: TcpStream,
    address: String,
}

impl TcpConnection {
    /// Connects, applies timeouts and consumes the welcome banner.
    pub fn open(config: &ClientConfig) -> Result<Self, ClientError> {
        let stream = connect_any(&config.address, config.timeout)
            .map_err(|e| ClientError::Connect(format!("{}: {}", config.address, e)))?;

        stream
            .set_read_timeout(Some(config.timeout))
            .and_then(|_| stream.set_write_timeout(Some(config.timeout)))
            .map_err(|e| ClientError::Connect(format!("{}: {}", config.address, e)))?;
        // Commands are tiny; do not wait to coalesce them.
        let _ = stream.set_nodelay(true);

        let mut conn = Self {
            stream,
            address: config.address.clone(),
        };

        let banner = conn.read_reply().map_err(|e| {
            ClientError::Connect(format!("{}: no welcome banner: {}", config.address, e))
        })?;
        debug!(address = %conn.address, banner = %banner.trim(), "connected to FAHClient");

        Ok(conn)
    }

    /// Sends one command line and returns the reply without the prompt.
    pub fn command(&mut self, command: &str) -> Result<String, ClientError> {
        trace!(address = %self.address, command, "sending command");
        let line = format!("{command}\n");
        self.stream
            .write_all(line.as_bytes())
            .and_then(|_| self.stream.flush())
            .map_err(io_error)?;
        self.read_reply()
    }

    /// Reads until the server prints its prompt at the start of a line.
    fn read_reply(&mut self) -> Result<String, ClientError> {
        let mut reply = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = self.stream.read(&mut chunk).map_err(io_error)?;
            if n == 0 {
                return Err(ClientError::Io(
                    "connection closed by FAHClient".to_string(),
                ));
            }
            reply.extend_from_slice(&chunk[..n]);

            if ends_with_prompt(&reply) {
                reply.truncate(reply.len() - PROMPT.len());
                return Ok(String::from_utf8_lossy(&reply).into_owned());
            }
            if reply.len() > MAX_REPLY_BYTES {
                return Err(ClientError::Protocol(format!(
                    "reply exceeds {MAX_REPLY_BYTES} bytes without a prompt"
                )));
            }
        }
    }
}

impl FahApi for TcpConnection {
    fn exec(&mut self, command: &str) -> Result<String, ClientError> {
        let reply = self.command(command)?;
        Ok(reply.trim().to_string())
    }

    fn info(&mut self) -> Result<Vec<InfoSection>, ClientError> {
        let reply = self.command("info")?;
        pyon::decode_info(&reply)
    }

    fn slot_info(&mut self) -> Result<Vec<SlotInfo>, ClientError> {
        let reply = self.command("slot-info")?;
        pyon::decode(&reply, "slots")
    }

    fn queue_info(&mut self) -> Result<Vec<QueueInfo>, ClientError> {
        let reply = self.command("queue-info")?;
        pyon::decode(&reply, "units")
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        // The peer may already be gone; nothing to report.
        let _ = self.stream.shutdown(Shutdown::Both);
        debug!(address = %self.address, "closed FAHClient connection");
    }
}

/// Tries each resolved address in turn, like `TcpStream::connect` but bounded.
fn connect_any(address: &str, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_error = None;
    for addr in address.to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
    }))
}

fn ends_with_prompt(reply: &[u8]) -> bool {
    reply == PROMPT || (reply.ends_with(PROMPT) && reply[reply.len() - PROMPT.len() - 1] == b'\n')
}

fn io_error(e: io::Error) -> ClientError {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => ClientError::Timeout(e.to_string()),
        _ => ClientError::Io(e.to_string()),
    }
}
