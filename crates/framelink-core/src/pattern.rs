//! Partial-message matching.

use crate::{FrameRole, Message, MessageType, is_message};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A subset of message fields with expected values.
///
/// Only the fields that are set take part in a comparison, so
/// `MessagePattern::new().kind(MessageType::Offer).request_id("42")` matches
/// any offer for request `42`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame2: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "requestId", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl MessagePattern {
    /// A pattern that matches every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `frame1` to be `role`.
    pub fn frame1(mut self, role: FrameRole) -> Self {
        self.frame1 = Some(role.as_str().to_owned());
        self
    }

    /// Require `frame2` to be `role`.
    pub fn frame2(mut self, role: FrameRole) -> Self {
        self.frame2 = Some(role.as_str().to_owned());
        self
    }

    /// Require the message type.
    pub fn kind(mut self, kind: MessageType) -> Self {
        self.kind = Some(kind.as_str().to_owned());
        self
    }

    /// Require the request id.
    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// The set fields as a JSON object.
    pub fn to_object(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(obj)) => obj,
            _ => Map::new(),
        }
    }

    /// Typed form of [`is_message_equal`].
    pub fn matches(&self, msg: &Message) -> bool {
        is_message_equal(&msg.to_value(), self)
    }
}

/// Whether `data` is a valid message agreeing with `pattern` on every field the
/// pattern sets.
///
/// Both sides are serialized with the pattern's keys in sorted order and the
/// resulting strings compared exactly. Fields of `data` outside the pattern are
/// left out of the comparison.
pub fn is_message_equal(data: &Value, pattern: &MessagePattern) -> bool {
    if !is_message(data) {
        return false;
    }
    let Some(data) = data.as_object() else {
        return false;
    };

    let expected = pattern.to_object();
    let keys: Vec<&str> = expected.keys().map(String::as_str).collect();

    match (canonical(data, &keys), canonical(&expected, &keys)) {
        (Ok(actual), Ok(expected)) => actual == expected,
        _ => false,
    }
}

fn canonical(obj: &Map<String, Value>, keys: &[&str]) -> serde_json::Result<String> {
    let picked: BTreeMap<&str, &Value> = keys
        .iter()
        .filter_map(|&key| obj.get(key).map(|value| (key, value)))
        .collect();
    serde_json::to_string(&picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn offer() -> Value {
        json!({
            "frame1": "guest",
            "frame2": "host",
            "type": "offer",
            "requestId": "42",
        })
    }

    #[test]
    fn subset_pattern_matches() {
        let pattern = MessagePattern::new().kind(MessageType::Offer).request_id("42");
        assert!(is_message_equal(&offer(), &pattern));
    }

    #[test]
    fn full_pattern_matches() {
        let pattern = MessagePattern::new()
            .frame1(FrameRole::Guest)
            .frame2(FrameRole::Host)
            .kind(MessageType::Offer)
            .request_id("42");
        assert!(is_message_equal(&offer(), &pattern));
    }

    #[test]
    fn differing_field_does_not_match() {
        let pattern = MessagePattern::new().request_id("99");
        assert!(!is_message_equal(&offer(), &pattern));

        let pattern = MessagePattern::new().frame1(FrameRole::Host).request_id("42");
        assert!(!is_message_equal(&offer(), &pattern));
    }

    #[test]
    fn invalid_data_never_matches() {
        assert!(!is_message_equal(&json!({}), &MessagePattern::new()));
        assert!(!is_message_equal(&Value::Null, &MessagePattern::new()));
        assert!(!is_message_equal(
            &json!({ "type": "offer", "requestId": "42" }),
            &MessagePattern::new().kind(MessageType::Offer).request_id("42"),
        ));
    }

    #[test]
    fn empty_pattern_matches_any_message() {
        assert!(is_message_equal(&offer(), &MessagePattern::new()));
    }

    #[test]
    fn extra_data_fields_are_ignored() {
        let mut data = offer();
        data["sourceId"] = json!("frame-1");
        data["port"] = json!({ "nested": [1, 2] });
        let pattern = MessagePattern::new().frame1(FrameRole::Guest);
        assert!(is_message_equal(&data, &pattern));
    }

    #[test]
    fn comparison_is_exact() {
        let pattern = MessagePattern {
            frame1: Some("Guest".into()),
            ..Default::default()
        };
        assert!(!is_message_equal(&offer(), &pattern));

        let pattern = MessagePattern {
            request_id: Some(" 42".into()),
            ..Default::default()
        };
        assert!(!is_message_equal(&offer(), &pattern));
    }

    #[test]
    fn typed_matches() {
        let msg = Message::offer(FrameRole::Guest, FrameRole::Sidebar, "r1");
        assert!(MessagePattern::new().frame2(FrameRole::Sidebar).matches(&msg));
        assert!(!MessagePattern::new().kind(MessageType::Request).matches(&msg));
    }

    #[test]
    fn pattern_object_has_only_set_fields() {
        let pattern = MessagePattern::new().kind(MessageType::Request).frame2(FrameRole::Host);
        assert_eq!(
            Value::Object(pattern.to_object()),
            json!({ "type": "request", "frame2": "host" })
        );
        assert!(MessagePattern::new().to_object().is_empty());
    }
}
