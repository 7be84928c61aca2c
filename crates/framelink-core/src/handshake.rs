//! Port discovery handshake.
//!
//! A seeker broadcasts a `request` naming the role it wants to reach; a
//! responder answers each distinct `requestId` with exactly one `offer`. Seekers
//! re-send the same request until answered, so responders must ignore repeats.
//!
//! ```text
//!   Seeker (sidebar)                         Responder (guest)
//!   request {sidebar, guest, r1}   ------>   first time r1: offer
//!   offer   {guest, sidebar, r1}   <------
//!   request {sidebar, guest, r1}   ------>   already answered: ignored
//! ```
//!
//! These types are pure; a transport feeds them payloads and sends what they
//! return.

use crate::{FrameRole, Message, MessagePattern, MessageType, OnceSet, is_message_equal};
use serde_json::Value;

/// Where a seeker is in its handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeekerState {
    /// Nothing sent yet.
    Idle,
    /// Request sent, waiting for the matching offer.
    AwaitingOffer { request_id: String },
    /// Offer received. Terminal.
    Connected { request_id: String },
    /// Gave up waiting. A new request may be started.
    Abandoned,
}

/// One frame looking for one counterpart.
#[derive(Debug, Clone)]
pub struct Seeker {
    role: FrameRole,
    counterpart: FrameRole,
    source_id: Option<String>,
    state: SeekerState,
}

impl Seeker {
    /// A seeker in `role` looking for `counterpart`.
    pub fn new(role: FrameRole, counterpart: FrameRole) -> Self {
        Self {
            role,
            counterpart,
            source_id: None,
            state: SeekerState::Idle,
        }
    }

    /// Tag outgoing requests with the id of this frame instance.
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// The role this seeker speaks for.
    pub fn role(&self) -> FrameRole {
        self.role
    }

    /// The role it is looking for.
    pub fn counterpart(&self) -> FrameRole {
        self.counterpart
    }

    /// Where the handshake stands.
    pub fn state(&self) -> &SeekerState {
        &self.state
    }

    /// Whether a matching offer has arrived.
    pub fn is_connected(&self) -> bool {
        matches!(self.state, SeekerState::Connected { .. })
    }

    /// The request to broadcast.
    ///
    /// Starting from `Idle` or `Abandoned` this begins a new attempt with
    /// `fresh_id`. While awaiting an offer the existing request is returned
    /// unchanged so retries keep their id. Once connected there is nothing to
    /// send.
    pub fn request(&mut self, fresh_id: impl Into<String>) -> Option<Message> {
        let request_id = match &self.state {
            SeekerState::Connected { .. } => return None,
            SeekerState::AwaitingOffer { request_id } => request_id.clone(),
            SeekerState::Idle | SeekerState::Abandoned => fresh_id.into(),
        };
        self.state = SeekerState::AwaitingOffer {
            request_id: request_id.clone(),
        };

        let msg = Message::request(self.role, self.counterpart, request_id);
        Some(match &self.source_id {
            Some(source_id) => msg.with_source_id(source_id.clone()),
            None => msg,
        })
    }

    /// The offer this seeker is waiting for, if any.
    pub fn offer_pattern(&self) -> Option<MessagePattern> {
        let SeekerState::AwaitingOffer { request_id } = &self.state else {
            return None;
        };
        Some(
            MessagePattern::new()
                .frame1(self.counterpart)
                .frame2(self.role)
                .kind(MessageType::Offer)
                .request_id(request_id.clone()),
        )
    }

    /// Feed an inbound payload. Returns `true` when it is the awaited offer,
    /// in which case the seeker is now connected.
    pub fn receive(&mut self, data: &Value) -> bool {
        let Some(pattern) = self.offer_pattern() else {
            return false;
        };
        if !is_message_equal(data, &pattern) {
            return false;
        }
        if let SeekerState::AwaitingOffer { request_id } =
            std::mem::replace(&mut self.state, SeekerState::Idle)
        {
            self.state = SeekerState::Connected { request_id };
        }
        true
    }

    /// Stop waiting for the current request.
    pub fn abandon(&mut self) {
        if matches!(self.state, SeekerState::AwaitingOffer { .. }) {
            self.state = SeekerState::Abandoned;
        }
    }
}

/// Answers requests, once per `requestId`.
#[derive(Debug, Clone, Default)]
pub struct Responder {
    role: Option<FrameRole>,
    answered: OnceSet,
}

impl Responder {
    /// Answer requests addressed to `role`.
    pub fn new(role: FrameRole) -> Self {
        Self {
            role: Some(role),
            answered: OnceSet::new(),
        }
    }

    /// Answer requests addressed to any role. Used by frames that hand out
    /// channels between two other frames; the caller decides what is allowed.
    pub fn broker() -> Self {
        Self::default()
    }

    /// The offer for `request`, or `None` if it is not a request for us or its
    /// id has been answered already.
    ///
    /// The offer swaps the frames (`frame1` is now the counterpart being
    /// offered, `frame2` the requester) and keeps `requestId` and `sourceId`.
    pub fn respond(&mut self, request: &Message) -> Option<Message> {
        if !request.is_request() {
            return None;
        }
        if self.role.is_some_and(|role| request.frame2 != role.as_str()) {
            return None;
        }
        if !self.answered.insert(request.request_id.as_str()) {
            return None;
        }

        Some(Message {
            frame1: request.frame2.clone(),
            frame2: request.frame1.clone(),
            kind: MessageType::Offer.as_str().to_owned(),
            request_id: request.request_id.clone(),
            source_id: request.source_id.clone(),
        })
    }

    /// Whether a request with `request_id` has been answered.
    pub fn has_answered(&self, request_id: &str) -> bool {
        self.answered.contains(request_id)
    }
}
