//! Metric records, their descriptors and text exposition.

mod descriptors;
mod exposition;

pub use descriptors::{MetricDescriptor, MetricDescriptors, NAMESPACE, fq_name};
pub use exposition::{ExpositionError, TEXT_CONTENT_TYPE, encode_text};

/// One sample produced by a poll.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub name: String,
    /// Label name/value pairs in the descriptor's declared order.
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl MetricRecord {
    /// Returns the value of a label, if present.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Receives the records emitted during a poll.
pub trait MetricSink {
    fn emit(&mut self, record: MetricRecord);
}

impl MetricSink for Vec<MetricRecord> {
    fn emit(&mut self, record: MetricRecord) {
        self.push(record);
    }
}
