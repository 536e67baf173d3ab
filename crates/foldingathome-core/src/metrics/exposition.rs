//! Prometheus text exposition of a poll's records.
//!
//! Every scrape builds a fresh `Registry`, so nothing carries over from one
//! poll to the next. Families appear only when the poll produced samples for
//! them.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use super::{MetricDescriptors, MetricRecord};

/// Content type of the text exposition format.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Error type for exposition failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpositionError {
    /// A record names a metric with no descriptor.
    UnknownMetric(String),
    /// The registry rejected a descriptor or a label set.
    Registry(String),
    /// Encoding the gathered families failed.
    Encode(String),
}

impl std::fmt::Display for ExpositionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpositionError::UnknownMetric(name) => write!(f, "unknown metric '{}'", name),
            ExpositionError::Registry(msg) => write!(f, "metric registry error: {}", msg),
            ExpositionError::Encode(msg) => write!(f, "failed to encode metrics: {}", msg),
        }
    }
}

impl std::error::Error for ExpositionError {}

/// Renders records as Prometheus text.
///
/// Records sharing a name and label values collapse to the last one.
pub fn encode_text(
    descriptors: &MetricDescriptors,
    records: &[MetricRecord],
) -> Result<String, ExpositionError> {
    let registry = Registry::new();
    let mut gauges: HashMap<&str, GaugeVec> = HashMap::new();

    for record in records {
        let gauge = match gauges.entry(record.name.as_str()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let descriptor = descriptors
                    .find(&record.name)
                    .ok_or_else(|| ExpositionError::UnknownMetric(record.name.clone()))?;
                let gauge = GaugeVec::new(
                    Opts::new(descriptor.name.clone(), descriptor.help.clone()),
                    &descriptor.label_names,
                )
                .map_err(|e| ExpositionError::Registry(e.to_string()))?;
                registry
                    .register(Box::new(gauge.clone()))
                    .map_err(|e| ExpositionError::Registry(e.to_string()))?;
                entry.insert(gauge)
            }
        };

        let values: Vec<&str> = record.labels.iter().map(|(_, v)| v.as_str()).collect();
        gauge
            .get_metric_with_label_values(&values)
            .map_err(|e| ExpositionError::Registry(format!("{}: {}", record.name, e)))?
            .set(record.value);
    }

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| ExpositionError::Encode(e.to_string()))?;

    String::from_utf8(buffer).map_err(|e| ExpositionError::Encode(e.to_string()))
}
