//! foldingathome-core — FAHClient metrics collection.
//!
//! Provides:
//! - `client` — command-server connection, PyON decoding, mock connector
//! - `collector` — poll orchestration, reply parsers, slot/queue join
//! - `metrics` — metric descriptors, records and Prometheus text exposition
//! - `util` — duration and timestamp parsing

pub mod client;
pub mod collector;
pub mod metrics;
pub mod util;

/// Version string reported at startup: crate version plus the build's git SHA.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("FAH_EXPORTER_GIT_SHA"),
    ")"
);
