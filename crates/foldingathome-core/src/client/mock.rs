//! In-memory FAHClient for testing the collector without a running daemon.
//!
//! `MockConnector` hands out `MockConnection`s that answer every query from
//! canned replies. Any query can be made to fail, and the connector counts
//! how many connections were opened and closed.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::ClientError;
use super::traits::{Connector, DATE_COMMAND, FahApi, UPTIME_COMMAND};
use super::types::{InfoSection, QueueInfo, SlotInfo};

/// The five queries issued during a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Uptime,
    Date,
    Info,
    Slots,
    Queue,
}

#[derive(Debug, Clone)]
struct MockReplies {
    uptime: Result<String, ClientError>,
    date: Result<String, ClientError>,
    info: Result<Vec<InfoSection>, ClientError>,
    slots: Result<Vec<SlotInfo>, ClientError>,
    queue: Result<Vec<QueueInfo>, ClientError>,
}

#[derive(Debug, Default)]
struct ConnectionStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Connector returning canned replies.
#[derive(Debug, Clone)]
pub struct MockConnector {
    replies: MockReplies,
    connect_error: Option<ClientError>,
    stats: Arc<ConnectionStats>,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    /// Creates a reachable client with no slots and no queued work.
    pub fn new() -> Self {
        Self {
            replies: MockReplies {
                uptime: Ok("0s".to_string()),
                date: Ok("1970-01-01T00:00:00Z".to_string()),
                info: Ok(vec![
                    InfoSection::new("FAHClient").with_entry("Version", "7.6.21"),
                ]),
                slots: Ok(Vec::new()),
                queue: Ok(Vec::new()),
            },
            connect_error: None,
            stats: Arc::new(ConnectionStats::default()),
        }
    }

    pub fn with_uptime(mut self, uptime: impl Into<String>) -> Self {
        self.replies.uptime = Ok(uptime.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.replies.date = Ok(date.into());
        self
    }

    pub fn with_info(mut self, info: Vec<InfoSection>) -> Self {
        self.replies.info = Ok(info);
        self
    }

    pub fn with_slots(mut self, slots: Vec<SlotInfo>) -> Self {
        self.replies.slots = Ok(slots);
        self
    }

    pub fn with_queue(mut self, queue: Vec<QueueInfo>) -> Self {
        self.replies.queue = Ok(queue);
        self
    }

    /// Makes one query fail with the given error.
    pub fn fail(mut self, query: Query, error: ClientError) -> Self {
        match query {
            Query::Uptime => self.replies.uptime = Err(error),
            Query::Date => self.replies.date = Err(error),
            Query::Info => self.replies.info = Err(error),
            Query::Slots => self.replies.slots = Err(error),
            Query::Queue => self.replies.queue = Err(error),
        }
        self
    }

    /// Makes `connect()` fail.
    pub fn refuse_connections(mut self, error: ClientError) -> Self {
        self.connect_error = Some(error);
        self
    }

    /// Number of successful `connect()` calls so far.
    pub fn opened(&self) -> usize {
        self.stats.opened.load(Ordering::SeqCst)
    }

    /// Number of connections dropped so far.
    pub fn closed(&self) -> usize {
        self.stats.closed.load(Ordering::SeqCst)
    }
}

impl Connector for MockConnector {
    type Connection = MockConnection;

    fn connect(&self) -> Result<MockConnection, ClientError> {
        if let Some(ref error) = self.connect_error {
            return Err(error.clone());
        }
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            replies: self.replies.clone(),
            stats: Arc::clone(&self.stats),
        })
    }

    fn address(&self) -> &str {
        "mock"
    }
}

/// Connection produced by `MockConnector`.
pub struct MockConnection {
    replies: MockReplies,
    stats: Arc<ConnectionStats>,
}

impl FahApi for MockConnection {
    fn exec(&mut self, command: &str) -> Result<String, ClientError> {
        match command {
            UPTIME_COMMAND => self.replies.uptime.clone(),
            DATE_COMMAND => self.replies.date.clone(),
            other => Err(ClientError::Protocol(format!("unknown command '{other}'"))),
        }
    }

    fn info(&mut self) -> Result<Vec<InfoSection>, ClientError> {
        self.replies.info.clone()
    }

    fn slot_info(&mut self) -> Result<Vec<SlotInfo>, ClientError> {
        self.replies.slots.clone()
    }

    fn queue_info(&mut self) -> Result<Vec<QueueInfo>, ClientError> {
        self.replies.queue.clone()
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================
// Scenarios
// ============================================================

impl MockConnector {
    /// A folding client with one CPU slot crunching a work unit and one GPU
    /// slot waiting to download.
    ///
    /// Replies keep the trailing `\` the real server leaves on `eval` output.
    pub fn typical_client() -> Self {
        Self::new()
            .with_uptime("14h 31m  2s\\")
            .with_date("2020-05-09T20:04:48Z\\")
            .with_info(vec![
                InfoSection::new("Folding@home Client")
                    .with_entry("Website", "https://foldingathome.org/"),
                InfoSection::new("FAHClient")
                    .with_entry("Version", "7.6.9")
                    .with_entry("Date", "Apr 17 2020"),
                InfoSection::new("CPU").with_entry("Cores", "4"),
            ])
            .with_slots(vec![
                SlotInfo {
                    id: "00".to_string(),
                    status: "RUNNING".to_string(),
                    description: "cpu:3".to_string(),
                },
                SlotInfo {
                    id: "01".to_string(),
                    status: "DOWNLOAD".to_string(),
                    description: "gpu:0:TU104 [GeForce RTX 2080]".to_string(),
                },
            ])
            .with_queue(vec![
                QueueInfo {
                    id: "00".to_string(),
                    slot: "00".to_string(),
                    state: "RUNNING".to_string(),
                    project: 13851,
                    run: 0,
                    clone: 45,
                    generation: 12,
                    percent_done: "45.36%".to_string(),
                    ppd: 123456.0,
                    credit_estimate: 9405.0,
                    eta: Duration::from_secs(8100),
                    time_remaining: Duration::from_secs(561600),
                    ..QueueInfo::default()
                },
                QueueInfo {
                    id: "01".to_string(),
                    slot: "01".to_string(),
                    state: "DOWNLOAD".to_string(),
                    attempts: 3,
                    next_attempt: Duration::from_secs(90),
                    ..QueueInfo::default()
                },
            ])
    }

    /// A reachable client whose only slot is paused with nothing queued.
    pub fn idle_client() -> Self {
        Self::new()
            .with_uptime("3m 12s\\")
            .with_date("2020-05-09T20:04:48Z\\")
            .with_slots(vec![SlotInfo {
                id: "00".to_string(),
                status: "PAUSED".to_string(),
                description: "cpu:2".to_string(),
            }])
    }

    /// A client that cannot be reached at all.
    pub fn unreachable() -> Self {
        Self::new().refuse_connections(ClientError::Connect(
            "localhost:36330: Connection refused (os error 111)".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_counts_connections() {
        let connector = MockConnector::typical_client();
        {
            let _a = connector.connect().unwrap();
            let _b = connector.connect().unwrap();
            assert_eq!(connector.opened(), 2);
            assert_eq!(connector.closed(), 0);
        }
        assert_eq!(connector.closed(), 2);
    }

    #[test]
    fn test_mock_unknown_command() {
        let connector = MockConnector::new();
        let mut conn = connector.connect().unwrap();
        assert!(conn.exec(UPTIME_COMMAND).is_ok());
        assert!(matches!(
            conn.exec("options"),
            Err(ClientError::Protocol(_))
        ));
    }

    #[test]
    fn test_mock_failures() {
        let connector = MockConnector::typical_client()
            .fail(Query::Slots, ClientError::Timeout("slot-info".to_string()));
        let mut conn = connector.connect().unwrap();
        assert!(conn.slot_info().is_err());
        assert_eq!(conn.queue_info().unwrap().len(), 2);

        let connector = MockConnector::unreachable();
        assert!(connector.connect().is_err());
        assert_eq!(connector.opened(), 0);
    }
}
