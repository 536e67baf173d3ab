//! FAHClient state collection.
//!
//! A poll connects once, runs five queries and turns the replies into
//! `MetricRecord`s pushed into a `MetricSink`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Collector                           │
//! │  uptime ─┐                                                  │
//! │  date   ─┼─► parsers ──────────────┐                        │
//! │  info   ─┘                         │                        │
//! │  slot-info ─► parse_slot_info ─────┼──► MetricSink          │
//! │  queue-info ─► join_queue ─────────┘        ▲               │
//! │                                             │               │
//! │                         foldingathome_up ───┘ (last)        │
//! └─────────────────────────────┬───────────────────────────────┘
//!                               │
//!                        ┌──────▼──────┐
//!                        │  Connector  │ (trait)
//!                        └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use foldingathome_core::client::MockConnector;
//! use foldingathome_core::collector::Collector;
//! use foldingathome_core::metrics::{MetricDescriptors, MetricRecord};
//!
//! let collector = Collector::new(
//!     MockConnector::typical_client(),
//!     Arc::new(MetricDescriptors::new()),
//! );
//! let mut records: Vec<MetricRecord> = Vec::new();
//! let report = collector.collect(&mut records);
//! assert!(report.up);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod parsers;
pub mod queue;
pub mod status;

pub use collector::{Collector, PollReport};
pub use parsers::{ParseError, parse_date, parse_info, parse_slot_info, parse_uptime};
pub use queue::join_queue;
pub use status::SlotStatus;
