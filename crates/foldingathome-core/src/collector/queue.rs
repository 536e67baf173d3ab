//! Joins queue entries against slots and emits per-unit gauges.
//!
//! Which gauges a queue entry produces depends on its state and on whether it
//! carries a work unit at all:
//!
//! | condition                         | gauges                                      |
//! |-----------------------------------|---------------------------------------------|
//! | state = download                  | slot attempts, slot next attempt            |
//! | state = running or finishing      | slot estimated points per day               |
//! | PRCG not (0, 0, 0, 0)             | all four `work_unit_*` gauges               |
//!
//! Entries whose slot id matches no slot are still reported, with empty `id`
//! and `slot_description` labels.

use std::collections::HashMap;

use tracing::debug;

use crate::client::{QueueInfo, SlotInfo};
use crate::metrics::{MetricDescriptors, MetricSink};

use super::status::SlotStatus;

/// Emits the gated queue gauges. Never fails.
pub fn join_queue(
    descriptors: &MetricDescriptors,
    sink: &mut dyn MetricSink,
    slots: &[SlotInfo],
    queue: &[QueueInfo],
) {
    // Rebuilt on every poll; a repeated id keeps the last slot.
    let lookup: HashMap<&str, &SlotInfo> =
        slots.iter().map(|slot| (slot.id.as_str(), slot)).collect();

    for unit in queue {
        let (id, description) = lookup
            .get(unit.slot.as_str())
            .map(|slot| (slot.id.as_str(), slot.description.as_str()))
            .unwrap_or(("", ""));
        let slot_labels = [id, description];
        let state = SlotStatus::parse(&unit.state);

        if state == SlotStatus::Download {
            sink.emit(
                descriptors
                    .slot_attempts
                    .record(unit.attempts as f64, &slot_labels),
            );
            sink.emit(
                descriptors
                    .slot_next_attempt
                    .record(unit.next_attempt.as_secs_f64(), &slot_labels),
            );
        }

        if state.is_crunching() {
            sink.emit(
                descriptors
                    .slot_estimated_points_per_day
                    .record(unit.ppd, &slot_labels),
            );
        }

        if !unit.has_work_unit() {
            continue;
        }

        let prcg = unit.prcg();
        let unit_labels = [id, description, prcg.as_str()];

        match parse_percent(&unit.percent_done) {
            Some(percent) => sink.emit(
                descriptors
                    .work_unit_steps_completed_percent
                    .record(percent, &unit_labels),
            ),
            None => debug!(
                unit = %unit.id,
                prcg = %prcg,
                percent_done = %unit.percent_done,
                "skipping unparsable work unit progress"
            ),
        }
        sink.emit(
            descriptors
                .work_unit_credit_estimate_points
                .record(unit.credit_estimate, &unit_labels),
        );
        sink.emit(
            descriptors
                .work_unit_estimated_completion_seconds
                .record(unit.eta.as_secs_f64(), &unit_labels),
        );
        sink.emit(
            descriptors
                .work_unit_time_remaining_seconds
                .record(unit.time_remaining.as_secs_f64(), &unit_labels),
        );
    }
}

/// Parses progress text such as `45.36%`.
fn parse_percent(text: &str) -> Option<f64> {
    text.strip_suffix('%').unwrap_or(text).parse().ok()
}
