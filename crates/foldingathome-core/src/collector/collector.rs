//! Poll orchestration.
//!
//! The `Collector` opens one connection per poll, runs every query, routes the
//! replies through the parsers and reports `foldingathome_up` last.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error};

use crate::client::{ClientError, Connector, DATE_COMMAND, FahApi, UPTIME_COMMAND};
use crate::metrics::{MetricDescriptors, MetricSink};

use super::parsers::{parse_date, parse_info, parse_slot_info, parse_uptime};
use super::queue::join_queue;

/// Outcome of a single poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollReport {
    /// Value reported as `foldingathome_up`.
    pub up: bool,
    /// Wall time spent polling, connection included.
    pub elapsed: Duration,
}

/// Collects FAHClient state into metric records.
///
/// Holds no per-poll state, so polls are independent and may run concurrently.
pub struct Collector<C: Connector> {
    connector: C,
    descriptors: Arc<MetricDescriptors>,
}

impl<C: Connector> Collector<C> {
    /// Creates a collector.
    ///
    /// # Arguments
    /// * `connector` - Opens connections to the FAHClient (TCP or mock)
    /// * `descriptors` - Gauge definitions shared with the exposition layer
    pub fn new(connector: C, descriptors: Arc<MetricDescriptors>) -> Self {
        Self {
            connector,
            descriptors,
        }
    }

    pub fn descriptors(&self) -> &MetricDescriptors {
        &self.descriptors
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Runs one poll, emitting every record into `sink`.
    ///
    /// Never fails: connection, query and parse errors are logged and folded
    /// into the `foldingathome_up` gauge, which is always emitted last.
    pub fn collect(&self, sink: &mut dyn MetricSink) -> PollReport {
        let start = Instant::now();

        let up = match self.connector.connect() {
            Ok(mut connection) => {
                debug!(address = self.connector.address(), "polling FAHClient");
                self.poll(&mut connection, sink)
                // connection dropped (closed) here
            }
            Err(e) => {
                error!(
                    address = self.connector.address(),
                    error = %e,
                    "failed to connect to FAHClient"
                );
                false
            }
        };

        sink.emit(self.descriptors.up.record(if up { 1.0 } else { 0.0 }, &[]));

        PollReport {
            up,
            elapsed: start.elapsed(),
        }
    }

    /// Issues all queries, then parses whatever came back.
    fn poll(&self, connection: &mut C::Connection, sink: &mut dyn MetricSink) -> bool {
        let mut up = true;

        let uptime = fetch("uptime", connection.exec(UPTIME_COMMAND), &mut up);
        let date = fetch("date", connection.exec(DATE_COMMAND), &mut up);
        let info = fetch("info", connection.info(), &mut up);
        let slots = fetch("slot-info", connection.slot_info(), &mut up);
        let queue = fetch("queue-info", connection.queue_info(), &mut up);

        let descriptors = self.descriptors.as_ref();

        if let Err(e) = parse_uptime(descriptors, sink, &uptime) {
            error!(error = %e, "failed to parse uptime");
            up = false;
        }
        if let Err(e) = parse_date(descriptors, sink, &date) {
            error!(error = %e, "failed to parse date");
            up = false;
        }
        if let Err(e) = parse_info(descriptors, sink, &info) {
            error!(error = %e, "failed to parse version");
            up = false;
        }
        parse_slot_info(descriptors, sink, &slots);
        join_queue(descriptors, sink, &slots, &queue);

        up
    }
}

/// Unwraps a query result, substituting an empty value on failure.
fn fetch<T: Default>(query: &str, result: Result<T, ClientError>, up: &mut bool) -> T {
    result.unwrap_or_else(|e| {
        error!(query, error = %e, "failed to collect from FAHClient");
        *up = false;
        T::default()
    })
}
