//! Core types for framelink.
//!
//! This crate provides the protocol primitives: the message envelope frames
//! exchange while discovering each other, the checks applied to inbound
//! payloads, and the handshake state machines. It does no I/O; transports
//! live in `framelink-frames`.

mod handshake;
mod message;
mod once;
mod pattern;
mod role;
mod source;

pub use handshake::{Responder, Seeker, SeekerState};
pub use message::{Message, MessageType, is_message};
pub use once::OnceSet;
pub use pattern::{MessagePattern, is_message_equal};
pub use role::{FrameRole, RoleParseError};
pub use source::{Capabilities, MessageSource, SourceClassifier, is_source_window};
