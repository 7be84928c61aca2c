//! The discovery message envelope.
//!
//! Messages arrive over a channel shared with arbitrary third-party traffic, so
//! the only way in is [`Message::parse`]: anything that does not have the
//! right shape is `None` and gets dropped by the caller without fuss.

use crate::FrameRole;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of a discovery message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// A frame announcing itself and handing over a channel endpoint.
    Offer,
    /// A frame asking to be connected to a counterpart.
    Request,
}

impl MessageType {
    /// The `type` string used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Request => "request",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated discovery message.
///
/// The fields stay strings: validation only checks shape, so a message with
/// an unknown role or type is still a message. Use [`Message::roles`] and
/// [`Message::kind`] to interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub frame1: String,
    pub frame2: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "requestId")]
    pub request_id: String,
    /// Identifies the requesting frame instance. Carried from a request to its
    /// offer; not part of validation.
    #[serde(rename = "sourceId", default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl Message {
    /// Convert an untrusted payload into a message.
    ///
    /// Returns `None` unless `data` is an object whose `frame1`, `frame2`,
    /// `type` and `requestId` members are all strings. Empty strings are fine.
    pub fn parse(data: &Value) -> Option<Self> {
        let obj = data.as_object()?;
        let field = |name: &str| -> Option<String> { Some(obj.get(name)?.as_str()?.to_owned()) };

        Some(Self {
            frame1: field("frame1")?,
            frame2: field("frame2")?,
            kind: field("type")?,
            request_id: field("requestId")?,
            source_id: field("sourceId"),
        })
    }

    /// Build a request from `from` asking for a link to `to`.
    pub fn request(from: FrameRole, to: FrameRole, request_id: impl Into<String>) -> Self {
        Self::new(from, to, MessageType::Request, request_id)
    }

    /// Build an offer from `from` to the frame `to`.
    pub fn offer(from: FrameRole, to: FrameRole, request_id: impl Into<String>) -> Self {
        Self::new(from, to, MessageType::Offer, request_id)
    }

    fn new(
        frame1: FrameRole,
        frame2: FrameRole,
        kind: MessageType,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            frame1: frame1.as_str().to_owned(),
            frame2: frame2.as_str().to_owned(),
            kind: kind.as_str().to_owned(),
            request_id: request_id.into(),
            source_id: None,
        }
    }

    /// Attach a source id.
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// The message type, if it is one this crate knows.
    pub fn kind(&self) -> Option<MessageType> {
        match self.kind.as_str() {
            "offer" => Some(MessageType::Offer),
            "request" => Some(MessageType::Request),
            _ => None,
        }
    }

    /// Whether this is a `request`.
    pub fn is_request(&self) -> bool {
        self.kind() == Some(MessageType::Request)
    }

    /// Whether this is an `offer`.
    pub fn is_offer(&self) -> bool {
        self.kind() == Some(MessageType::Offer)
    }

    /// `(frame1, frame2)` as roles, if both are known roles.
    pub fn roles(&self) -> Option<(FrameRole, FrameRole)> {
        Some((self.frame1.parse().ok()?, self.frame2.parse().ok()?))
    }

    /// Channel name, `frame1-frame2`.
    pub fn channel(&self) -> String {
        format!("{}-{}", self.frame1, self.frame2)
    }

    /// The wire form.
    pub fn to_value(&self) -> Value {
        // Every field is a string, so serialization cannot fail.
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl From<&Message> for Value {
    fn from(msg: &Message) -> Self {
        msg.to_value()
    }
}

/// Whether `data` has the shape of a discovery message.
pub fn is_message(data: &Value) -> bool {
    Message::parse(data).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_complete_message() {
        assert!(is_message(&json!({
            "frame1": "a",
            "frame2": "b",
            "type": "request",
            "requestId": "1",
        })));
    }

    #[test]
    fn rejects_partial_and_non_objects() {
        assert!(!is_message(&json!({ "frame1": "a" })));
        assert!(!is_message(&Value::Null));
        assert!(!is_message(&json!("x")));
        assert!(!is_message(&json!(42)));
        assert!(!is_message(&json!(["frame1", "frame2", "type", "requestId"])));
    }

    #[test]
    fn rejects_non_string_fields() {
        let valid = json!({
            "frame1": "guest",
            "frame2": "host",
            "type": "request",
            "requestId": "abc",
        });
        for field in ["frame1", "frame2", "type", "requestId"] {
            let mut data = valid.clone();
            data[field] = json!(1);
            assert!(!is_message(&data), "{field} as number");
            data[field] = Value::Null;
            assert!(!is_message(&data), "{field} as null");
        }
    }

    #[test]
    fn accepts_empty_strings() {
        assert!(is_message(&json!({
            "frame1": "",
            "frame2": "",
            "type": "",
            "requestId": "",
        })));
    }

    // `type` is deliberately not limited to offer/request.
    #[test]
    fn accepts_unknown_type() {
        let data = json!({
            "frame1": "guest",
            "frame2": "host",
            "type": "handshake-v2",
            "requestId": "abc",
        });
        let msg = Message::parse(&data).unwrap();
        assert_eq!(msg.kind, "handshake-v2");
        assert_eq!(msg.kind(), None);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let msg = Message::parse(&json!({
            "frame1": "guest",
            "frame2": "sidebar",
            "type": "offer",
            "requestId": "abc",
            "sourceId": "frame-7",
            "unrelated": true,
        }))
        .unwrap();
        assert_eq!(msg.source_id.as_deref(), Some("frame-7"));
        assert_eq!(msg.roles(), Some((FrameRole::Guest, FrameRole::Sidebar)));
        assert!(msg.is_offer());
    }

    #[test]
    fn wire_form_uses_protocol_names() {
        let msg = Message::request(FrameRole::Sidebar, FrameRole::Host, "r1").with_source_id("s");
        assert_eq!(
            msg.to_value(),
            json!({
                "frame1": "sidebar",
                "frame2": "host",
                "type": "request",
                "requestId": "r1",
                "sourceId": "s",
            })
        );
        assert_eq!(msg.channel(), "sidebar-host");
    }

    #[test]
    fn wire_form_omits_missing_source_id() {
        let msg = Message::offer(FrameRole::Host, FrameRole::Guest, "r2");
        let value = msg.to_value();
        assert!(value.get("sourceId").is_none());
        assert_eq!(Message::parse(&value), Some(msg));
    }
}
