//! The fixed set of gauges exported for a FAHClient.

use super::MetricRecord;

pub const NAMESPACE: &str = "foldingathome";
const SUBSYSTEM_SLOT: &str = "slot";
const SUBSYSTEM_WORK_UNIT: &str = "work_unit";

const SLOT_LABELS: &[&str] = &["id", "slot_description"];
const WORK_UNIT_LABELS: &[&str] = &["id", "slot_description", "prcg"];

/// Joins the non-empty parts of a metric name with `_`.
pub fn fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// Name, help text and label schema of one gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: String,
    pub label_names: Vec<&'static str>,
}

impl MetricDescriptor {
    pub fn new(subsystem: &str, name: &str, help: &str, label_names: &[&'static str]) -> Self {
        Self {
            name: fq_name(NAMESPACE, subsystem, name),
            help: help.to_string(),
            label_names: label_names.to_vec(),
        }
    }

    /// Builds a record for this gauge.
    ///
    /// `label_values` pairs up with `label_names` in declared order.
    pub fn record(&self, value: f64, label_values: &[&str]) -> MetricRecord {
        debug_assert_eq!(
            label_values.len(),
            self.label_names.len(),
            "label values for {}",
            self.name
        );
        MetricRecord {
            name: self.name.clone(),
            labels: self
                .label_names
                .iter()
                .zip(label_values)
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            value,
        }
    }
}

/// All exported gauges. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptors {
    pub up: MetricDescriptor,
    pub uptime: MetricDescriptor,
    pub time: MetricDescriptor,
    pub version: MetricDescriptor,
    pub slot_status: MetricDescriptor,
    pub slot_attempts: MetricDescriptor,
    pub slot_next_attempt: MetricDescriptor,
    pub slot_estimated_points_per_day: MetricDescriptor,
    pub work_unit_steps_completed_percent: MetricDescriptor,
    pub work_unit_credit_estimate_points: MetricDescriptor,
    pub work_unit_estimated_completion_seconds: MetricDescriptor,
    pub work_unit_time_remaining_seconds: MetricDescriptor,
}

impl Default for MetricDescriptors {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricDescriptors {
    pub fn new() -> Self {
        Self {
            up: MetricDescriptor::new("", "up", "Could the FAHClient be reached.", &[]),
            uptime: MetricDescriptor::new(
                "",
                "uptime_seconds",
                "Number of seconds since the FAHClient started.",
                &[],
            ),
            time: MetricDescriptor::new(
                "",
                "time_seconds",
                "Current UNIX time according to the server.",
                &[],
            ),
            version: MetricDescriptor::new(
                "",
                "version",
                "The version of this FAHClient.",
                &["version"],
            ),
            slot_status: MetricDescriptor::new(
                SUBSYSTEM_SLOT,
                "status",
                "The status of the slot, encoded numerically. 0 => unknown, 1 => ready, \
                 2 => download, 3 => running, 4 => upload, 5 => finishing, 6 => stopping, \
                 7 => paused",
                SLOT_LABELS,
            ),
            slot_attempts: MetricDescriptor::new(
                SUBSYSTEM_SLOT,
                "attempts",
                "Number of attempts to download a work unit.",
                SLOT_LABELS,
            ),
            slot_next_attempt: MetricDescriptor::new(
                SUBSYSTEM_SLOT,
                "next_attempt_seconds",
                "Seconds until the next attempt to download a work unit.",
                SLOT_LABELS,
            ),
            slot_estimated_points_per_day: MetricDescriptor::new(
                SUBSYSTEM_SLOT,
                "estimated_points_per_day",
                "Estimated number of points the slot can produce in a day.",
                SLOT_LABELS,
            ),
            work_unit_steps_completed_percent: MetricDescriptor::new(
                SUBSYSTEM_WORK_UNIT,
                "steps_completed_percent",
                "Work unit completion percentage.",
                WORK_UNIT_LABELS,
            ),
            work_unit_credit_estimate_points: MetricDescriptor::new(
                SUBSYSTEM_WORK_UNIT,
                "credit_estimate_points",
                "Estimated number of points that will be credited for the work unit.",
                WORK_UNIT_LABELS,
            ),
            work_unit_estimated_completion_seconds: MetricDescriptor::new(
                SUBSYSTEM_WORK_UNIT,
                "estimated_completion_seconds",
                "Estimated seconds until the work unit is completed.",
                WORK_UNIT_LABELS,
            ),
            work_unit_time_remaining_seconds: MetricDescriptor::new(
                SUBSYSTEM_WORK_UNIT,
                "time_remaining_seconds",
                "Seconds until the work unit's deadline, after which the work unit is \
                 expired and will be discarded by the client.",
                WORK_UNIT_LABELS,
            ),
        }
    }

    /// All descriptors, in declaration order.
    pub fn all(&self) -> [&MetricDescriptor; 12] {
        [
            &self.up,
            &self.uptime,
            &self.time,
            &self.version,
            &self.slot_status,
            &self.slot_attempts,
            &self.slot_next_attempt,
            &self.slot_estimated_points_per_day,
            &self.work_unit_steps_completed_percent,
            &self.work_unit_credit_estimate_points,
            &self.work_unit_estimated_completion_seconds,
            &self.work_unit_time_remaining_seconds,
        ]
    }

    pub fn find(&self, name: &str) -> Option<&MetricDescriptor> {
        self.all().into_iter().find(|d| d.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fq_name() {
        assert_eq!(fq_name("foldingathome", "", "up"), "foldingathome_up");
        assert_eq!(
            fq_name("foldingathome", "slot", "status"),
            "foldingathome_slot_status"
        );
    }

    #[test]
    fn test_descriptor_names() {
        let names: Vec<String> = MetricDescriptors::new()
            .all()
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "foldingathome_up",
                "foldingathome_uptime_seconds",
                "foldingathome_time_seconds",
                "foldingathome_version",
                "foldingathome_slot_status",
                "foldingathome_slot_attempts",
                "foldingathome_slot_next_attempt_seconds",
                "foldingathome_slot_estimated_points_per_day",
                "foldingathome_work_unit_steps_completed_percent",
                "foldingathome_work_unit_credit_estimate_points",
                "foldingathome_work_unit_estimated_completion_seconds",
                "foldingathome_work_unit_time_remaining_seconds",
            ]
        );
    }

    #[test]
    fn test_record_labels_follow_declared_order() {
        let descriptors = MetricDescriptors::new();
        let record = descriptors
            .work_unit_credit_estimate_points
            .record(9405.0, &["00", "cpu:3", "13851 (0, 45, 12)"]);
        assert_eq!(record.name, "foldingathome_work_unit_credit_estimate_points");
        assert_eq!(
            record.labels,
            vec![
                ("id".to_string(), "00".to_string()),
                ("slot_description".to_string(), "cpu:3".to_string()),
                ("prcg".to_string(), "13851 (0, 45, 12)".to_string()),
            ]
        );
        assert_eq!(record.value, 9405.0);
    }

    #[test]
    fn test_find() {
        let descriptors = MetricDescriptors::new();
        assert_eq!(
            descriptors.find("foldingathome_version").map(|d| &d.label_names),
            Some(&vec!["version"])
        );
        assert!(descriptors.find("foldingathome_nope").is_none());
    }
}
