//! PyON message decoding.
//!
//! Structured replies of the command server are framed as:
//!
//! ```text
//! PyON 1 slots
//! [{"id": "00", "status": "RUNNING", "idle": False}]
//! ---
//! ```
//!
//! The body is a Python literal. It differs from JSON only in the bare words
//! `True`, `False` and `None`, which are rewritten before handing the body to
//! `serde_json`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ClientError;
use super::types::InfoSection;

const HEADER: &str = "PyON ";
const TRAILER: &str = "\n---";

/// A framed PyON message borrowed from a raw reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyonMessage<'a> {
    /// Message type from the header, e.g. `slots` or `units`.
    pub kind: &'a str,
    pub body: &'a str,
}

/// Locates the PyON frame inside a raw command reply.
pub fn extract_message(reply: &str) -> Result<PyonMessage<'_>, ClientError> {
    let start = reply
        .find(HEADER)
        .ok_or_else(|| ClientError::Protocol("reply has no PyON header".to_string()))?;
    let framed = &reply[start..];

    let header_end = framed
        .find('\n')
        .ok_or_else(|| ClientError::Protocol("PyON header is not terminated".to_string()))?;
    let header = &framed[..header_end];

    // "PyON <version> <kind>"; the version is not checked.
    let kind = header
        .split_whitespace()
        .nth(2)
        .ok_or_else(|| ClientError::Protocol(format!("malformed PyON header '{header}'")))?;

    let body_and_trailer = &framed[header_end..];
    let body_end = body_and_trailer
        .find(TRAILER)
        .ok_or_else(|| ClientError::Protocol("PyON message has no trailer".to_string()))?;

    Ok(PyonMessage {
        kind,
        body: body_and_trailer[..body_end].trim(),
    })
}

/// Rewrites Python literal keywords outside string literals into JSON.
pub fn to_json(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut word = String::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in body.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c.is_ascii_alphabetic() {
            word.push(c);
            continue;
        }

        flush_word(&mut out, &mut word);
        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }
    flush_word(&mut out, &mut word);

    out
}

fn flush_word(out: &mut String, word: &mut String) {
    if word.is_empty() {
        return;
    }
    match word.as_str() {
        "True" => out.push_str("true"),
        "False" => out.push_str("false"),
        "None" => out.push_str("null"),
        other => out.push_str(other),
    }
    word.clear();
}

/// Extracts and deserializes a PyON message of the expected type.
pub fn decode<T: DeserializeOwned>(reply: &str, expected_kind: &str) -> Result<T, ClientError> {
    let message = extract_message(reply)?;
    if message.kind != expected_kind {
        return Err(ClientError::Protocol(format!(
            "expected PyON '{expected_kind}' message, got '{}'",
            message.kind
        )));
    }

    serde_json::from_str(&to_json(message.body))
        .map_err(|e| ClientError::Decode(format!("{expected_kind}: {e}")))
}

/// Converts the `info` reply body into sections.
///
/// Shape: `[["FAHClient", ["Version", "7.6.9"], ...], ...]`. Entries that are
/// not `[key, value]` pairs are skipped.
pub fn decode_info(reply: &str) -> Result<Vec<InfoSection>, ClientError> {
    let value: Value = decode(reply, "info")?;

    let Value::Array(sections) = value else {
        return Err(ClientError::Decode("info: expected a list of sections".to_string()));
    };

    let mut result = Vec::with_capacity(sections.len());
    for section in sections {
        let Value::Array(items) = section else {
            return Err(ClientError::Decode("info: section is not a list".to_string()));
        };
        let mut items = items.into_iter();
        let name = match items.next() {
            Some(Value::String(name)) => name,
            _ => {
                return Err(ClientError::Decode(
                    "info: section has no name".to_string(),
                ));
            }
        };

        let mut parsed = InfoSection::new(name);
        for item in items {
            if let Value::Array(pair) = item
                && let [Value::String(key), value, ..] = pair.as_slice()
            {
                parsed.entries.push((key.clone(), value_to_text(value)));
            }
        }
        result.push(parsed);
    }

    Ok(result)
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::SlotInfo;

    const SLOTS_REPLY: &str = "\nPyON 1 slots\n[\n  {\n    \"id\": \"00\",\n    \"status\": \"RUNNING\",\n    \"description\": \"cpu:3\",\n    \"options\": {},\n    \"reason\": \"\",\n    \"idle\": False\n  }\n]\n---\n";

    #[test]
    fn test_extract_message() {
        let message = extract_message(SLOTS_REPLY).unwrap();
        assert_eq!(message.kind, "slots");
        assert!(message.body.starts_with('['));
        assert!(message.body.ends_with(']'));
    }

    #[test]
    fn test_extract_message_errors() {
        assert!(matches!(
            extract_message("ERROR: unknown command"),
            Err(ClientError::Protocol(_))
        ));
        assert!(matches!(
            extract_message("PyON 1 slots\n[]"),
            Err(ClientError::Protocol(_))
        ));
        assert!(matches!(
            extract_message("PyON\n[]\n---"),
            Err(ClientError::Protocol(_))
        ));
    }

    #[test]
    fn test_to_json_keywords() {
        assert_eq!(
            to_json(r#"{"a": True, "b": False, "c": None}"#),
            r#"{"a": true, "b": false, "c": null}"#
        );
    }

    #[test]
    fn test_to_json_leaves_strings_alone() {
        assert_eq!(
            to_json(r#"["True", "say \"None\"", False]"#),
            r#"["True", "say \"None\"", false]"#
        );
    }

    #[test]
    fn test_decode_slots() {
        let slots: Vec<SlotInfo> = decode(SLOTS_REPLY, "slots").unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].id, "00");
        assert_eq!(slots[0].status, "RUNNING");
        assert_eq!(slots[0].description, "cpu:3");
    }

    #[test]
    fn test_decode_wrong_kind() {
        let result: Result<Vec<SlotInfo>, _> = decode(SLOTS_REPLY, "units");
        assert!(matches!(result, Err(ClientError::Protocol(_))));
    }

    #[test]
    fn test_decode_info() {
        let reply = "PyON 1 info\n[\n  [\n    \"FAHClient\",\n    [\"Version\", \"7.6.9\"],\n    [\"Has Battery\", False]\n  ],\n  [\n    \"CPU\",\n    [\"Cores\", 8]\n  ]\n]\n---\n";
        let info = decode_info(reply).unwrap();
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].name, "FAHClient");
        assert_eq!(info[0].get("Version"), Some("7.6.9"));
        assert_eq!(info[0].get("Has Battery"), Some("false"));
        assert_eq!(info[1].get("Cores"), Some("8"));
    }

    #[test]
    fn test_decode_info_malformed() {
        let reply = "PyON 1 info\n[[1, [\"Version\", \"7.6.9\"]]]\n---\n";
        assert!(matches!(decode_info(reply), Err(ClientError::Decode(_))));
    }
}
