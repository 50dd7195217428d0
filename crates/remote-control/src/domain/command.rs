//! # Commands and Acknowledgements
//!
//! The inner messages carried inside the signed envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::errors::{DecodeError, EncodeError};

/// Correlation id: the client-chosen `time` of a command, echoed back as
/// the acknowledgement's `action`.
///
/// The value is attacker-supplied. It is only ever compared and echoed,
/// never interpreted as a clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(i64);

impl CorrelationId {
    /// Wrap a raw millisecond value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw value.
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CorrelationId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A decoded command: `{ time, command, ...operation fields }`.
///
/// Everything except `time` is kept as raw JSON so the dispatcher can
/// report a missing or mistyped field precisely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Correlation id.
    pub time: CorrelationId,
    /// `command` and every operation-specific field.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Command {
    /// Key holding the operation name.
    pub const COMMAND_KEY: &'static str = "command";

    /// Create a command for `operation` correlated by `time`.
    pub fn new(time: impl Into<CorrelationId>, operation: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(Self::COMMAND_KEY.to_string(), Value::from(operation));
        Self {
            time: time.into(),
            fields,
        }
    }

    /// Add an operation-specific field.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Raw `command` value, if present.
    pub fn operation(&self) -> Option<&Value> {
        self.fields.get(Self::COMMAND_KEY)
    }

    /// Raw value of an operation-specific field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Decode from the text of an envelope's `message`.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode as the text placed in an envelope's `message`.
    pub fn encode(&self) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Acknowledgement returned for every dispatched command and health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// The originating command's `time`; `None` for health probes.
    pub action: Option<CorrelationId>,
    /// Responder send time in milliseconds.
    pub time: i64,
    /// Controller result.
    pub result: bool,
    /// Diagnostic on failure, `None` otherwise.
    pub message: Option<String>,
}

impl Acknowledgement {
    /// Decode from the text of a response envelope's `message`.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode as the text placed in a response envelope's `message`.
    pub fn encode(&self) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_decode_keeps_operation_fields() {
        let command = Command::decode(r#"{"time": 1700000000123, "command": "seek", "seconds": 30}"#)
            .unwrap();

        assert_eq!(command.time, CorrelationId::new(1_700_000_000_123));
        assert_eq!(command.operation(), Some(&json!("seek")));
        assert_eq!(command.field("seconds"), Some(&json!(30)));
        assert!(command.field("time").is_none());
    }

    #[test]
    fn test_command_without_time_is_rejected() {
        assert!(Command::decode(r#"{"command": "stop"}"#).is_err());
    }

    #[test]
    fn test_command_with_fractional_time_is_rejected() {
        assert!(Command::decode(r#"{"time": 1.5, "command": "stop"}"#).is_err());
    }

    #[test]
    fn test_command_with_negative_time() {
        let command = Command::decode(r#"{"time": -42, "command": "stop"}"#).unwrap();
        assert_eq!(command.time.as_i64(), -42);
    }

    #[test]
    fn test_command_builder_encodes_all_fields() {
        let text = Command::new(7, "play")
            .with_field("path", "movies/a.mkv")
            .encode()
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(
            value,
            json!({"time": 7, "command": "play", "path": "movies/a.mkv"})
        );
    }

    #[test]
    fn test_acknowledgement_field_order_and_nulls() {
        let ack = Acknowledgement {
            action: Some(CorrelationId::new(5)),
            time: 10,
            result: true,
            message: None,
        };

        assert_eq!(
            ack.encode().unwrap(),
            r#"{"action":5,"time":10,"result":true,"message":null}"#
        );
    }

    #[test]
    fn test_health_acknowledgement_has_null_action() {
        let ack = Acknowledgement {
            action: None,
            time: 10,
            result: true,
            message: None,
        };
        let decoded = Acknowledgement::decode(&ack.encode().unwrap()).unwrap();

        assert_eq!(decoded.action, None);
        assert_eq!(decoded, ack);
    }

    #[test]
    fn test_correlation_id_display() {
        assert_eq!(CorrelationId::new(1234).to_string(), "1234");
    }
}
