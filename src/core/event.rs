//! Events fed into a state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

/// Opaque event payload.
pub type Payload = Map<String, Value>;

/// Trait for event types.
///
/// Transitions are keyed by `(from state, event kind)`, so the kind must be
/// comparable. `name` is used in history, diagnostics and graph labels.
pub trait EventKind:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Stable name of the event type, e.g. `LOGIN_REQUEST`.
    fn name(&self) -> &str;
}

/// An event value: a kind, an optional payload and the moment it was issued.
///
/// Events have no identity. The engine never reads a clock of its own, so
/// `timestamp` is the only notion of "now" guards and actions see.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Event<E: EventKind> {
    pub kind: E,
    #[serde(default)]
    pub payload: Payload,
    pub timestamp: DateTime<Utc>,
}

impl<E: EventKind> Event<E> {
    /// Create an event with an empty payload.
    pub fn new(kind: E, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            payload: Payload::new(),
            timestamp,
        }
    }

    /// Create an event stamped with the current wall-clock time.
    pub fn now(kind: E) -> Self {
        Self::new(kind, Utc::now())
    }

    /// Replace the payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Insert a single payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Look up a payload field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Look up a string payload field.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Ping {
        Ping,
    }

    impl EventKind for Ping {
        fn name(&self) -> &str {
            "PING"
        }
    }

    #[test]
    fn fields_are_readable() {
        let event = Event::now(Ping::Ping)
            .with_field("reason", "test")
            .with_field("count", 3);

        assert_eq!(event.name(), "PING");
        assert_eq!(event.str_field("reason"), Some("test"));
        assert_eq!(event.field("count"), Some(&Value::from(3)));
        assert!(event.field("missing").is_none());
        assert!(event.str_field("count").is_none());
    }

    #[test]
    fn events_with_same_content_are_equal() {
        let at = Utc::now();
        let a = Event::new(Ping::Ping, at).with_field("k", "v");
        let b = Event::new(Ping::Ping, at).with_field("k", "v");
        assert_eq!(a, b);
    }

    #[test]
    fn missing_payload_deserializes_empty() {
        let json = format!(r#"{{"kind":"Ping","timestamp":"{}"}}"#, Utc::now().to_rfc3339());
        let event: Event<Ping> = serde_json::from_str(&json).unwrap();
        assert!(event.payload.is_empty());
    }
}
