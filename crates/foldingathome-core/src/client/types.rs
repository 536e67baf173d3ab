//! Typed replies of the FAHClient command server.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::util::parse_fah_duration;

/// One section of the `info` reply, e.g. `FAHClient` or `CPU`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoSection {
    pub name: String,
    /// Key/value pairs in reply order.
    pub entries: Vec<(String, String)>,
}

impl InfoSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Returns the value of the first entry with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A configured compute slot (`slot-info`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SlotInfo {
    pub id: String,
    /// Raw status text, e.g. `RUNNING`.
    pub status: String,
    pub description: String,
}

/// A work unit entry of the queue (`queue-info`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueInfo {
    pub id: String,
    /// Id of the slot the unit belongs to. May not match any slot.
    pub slot: String,
    /// Raw state text, same vocabulary as slot status.
    pub state: String,
    pub attempts: i64,
    #[serde(rename = "nextattempt", deserialize_with = "fah_duration")]
    pub next_attempt: Duration,
    #[serde(deserialize_with = "number")]
    pub ppd: f64,
    pub project: i64,
    pub run: i64,
    pub clone: i64,
    #[serde(rename = "gen")]
    pub generation: i64,
    /// Progress text with a trailing `%`, e.g. `45.36%`.
    #[serde(rename = "percentdone")]
    pub percent_done: String,
    #[serde(rename = "creditestimate", deserialize_with = "number")]
    pub credit_estimate: f64,
    #[serde(deserialize_with = "fah_duration")]
    pub eta: Duration,
    #[serde(rename = "timeremaining", deserialize_with = "fah_duration")]
    pub time_remaining: Duration,
}

impl QueueInfo {
    /// True when the unit carries a real (project, run, clone, gen) identity.
    pub fn has_work_unit(&self) -> bool {
        !(self.project == 0 && self.run == 0 && self.clone == 0 && self.generation == 0)
    }

    /// Display label `"<project> (<run>, <clone>, <gen>)"`.
    pub fn prcg(&self) -> String {
        format!(
            "{} ({}, {}, {})",
            self.project, self.run, self.clone, self.generation
        )
    }
}

/// Numeric field sent either as a JSON number or as a numeric string.
fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom(format!("number out of range: {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid number '{s}'"))),
        Value::Null => Ok(0.0),
        other => Err(serde::de::Error::custom(format!(
            "expected number, got {other}"
        ))),
    }
}

/// Spelled-out duration such as `2 hours 15 mins`.
fn fah_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => parse_fah_duration(&s).map_err(serde::de::Error::custom),
        Value::Null => Ok(Duration::ZERO),
        other => Err(serde::de::Error::custom(format!(
            "expected duration text, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_info_from_json() {
        let json = r#"{
            "id": "01", "state": "RUNNING", "error": "NO_ERROR",
            "project": 13851, "run": 0, "clone": 45, "gen": 12,
            "core": "0xa7", "percentdone": "45.36%", "eta": "2 hours 15 mins",
            "ppd": "123456", "creditestimate": "9405", "waitingon": "",
            "nextattempt": "0.00 secs", "timeremaining": "6.50 days",
            "attempts": 0, "slot": "00", "tpf": "3 mins 02 secs"
        }"#;

        let unit: QueueInfo = serde_json::from_str(json).unwrap();
        assert_eq!(unit.slot, "00");
        assert_eq!(unit.state, "RUNNING");
        assert_eq!(unit.project, 13851);
        assert_eq!(unit.generation, 12);
        assert_eq!(unit.ppd, 123456.0);
        assert_eq!(unit.credit_estimate, 9405.0);
        assert_eq!(unit.eta, Duration::from_secs(8100));
        assert_eq!(unit.next_attempt, Duration::ZERO);
        assert_eq!(unit.time_remaining, Duration::from_secs(561600));
        assert_eq!(unit.percent_done, "45.36%");
        assert_eq!(unit.prcg(), "13851 (0, 45, 12)");
        assert!(unit.has_work_unit());
    }

    #[test]
    fn test_queue_info_missing_fields() {
        let unit: QueueInfo = serde_json::from_str(r#"{"slot": "01"}"#).unwrap();
        assert_eq!(unit.slot, "01");
        assert_eq!(unit.eta, Duration::ZERO);
        assert!(!unit.has_work_unit());
    }

    #[test]
    fn test_queue_info_bad_ppd() {
        let result: Result<QueueInfo, _> = serde_json::from_str(r#"{"ppd": "lots"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_slot_info_ignores_extra_fields() {
        let json = r#"{"id": "00", "status": "READY", "description": "cpu:4",
                       "options": {"paused": "false"}, "reason": "", "idle": false}"#;
        let slot: SlotInfo = serde_json::from_str(json).unwrap();
        assert_eq!(slot.id, "00");
        assert_eq!(slot.status, "READY");
        assert_eq!(slot.description, "cpu:4");
    }

    #[test]
    fn test_info_section_get() {
        let section = InfoSection::new("FAHClient")
            .with_entry("Version", "7.6.9")
            .with_entry("Version", "ignored");
        assert_eq!(section.get("Version"), Some("7.6.9"));
        assert_eq!(section.get("Author"), None);
    }
}
