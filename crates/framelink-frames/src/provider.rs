//! The answering side of port discovery.

use crate::{Endpoint, MessageEvent, PortSender, ProviderConfig, Window, channel};
use framelink_core::{
    FrameRole, Message, MessagePattern, MessageType, OnceSet, Responder, SourceClassifier,
    is_message_equal,
};
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Origins a route accepts requests from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigin {
    Any,
    Exact(String),
}

impl AllowedOrigin {
    /// Whether a request from `origin` is acceptable.
    pub fn permits(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(allowed) => allowed == origin,
        }
    }
}

/// A kind of request a provider is willing to answer.
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: MessagePattern,
    pub allowed_origin: AllowedOrigin,
}

impl Route {
    /// Requests from `requester` for `target`.
    pub fn new(requester: FrameRole, target: FrameRole, allowed_origin: AllowedOrigin) -> Self {
        Self {
            pattern: MessagePattern::new()
                .frame1(requester)
                .frame2(target)
                .kind(MessageType::Request),
            allowed_origin,
        }
    }

    /// Requests from anyone for `target`.
    pub fn to(target: FrameRole, allowed_origin: AllowedOrigin) -> Self {
        Self {
            pattern: MessagePattern::new().frame2(target).kind(MessageType::Request),
            allowed_origin,
        }
    }

    fn accepts(&self, event: &MessageEvent) -> bool {
        self.allowed_origin.permits(&event.origin) && is_message_equal(&event.data, &self.pattern)
    }
}

/// Why a request was turned down. Each distinct rejection is reported once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("ignored port request for channel {channel} from non-window source")]
    NonWindowSource { channel: String },
    #[error("ignored invalid port request for channel {channel} from {origin}")]
    DisallowedRequest { channel: String, origin: String },
    #[error("no relay to deliver channel {channel} to {frame}")]
    NoRelay { channel: String, frame: FrameRole },
    #[error("relay to {frame} closed while delivering channel {channel}")]
    RelayClosed { channel: String, frame: FrameRole },
}

/// Something the owner of a provider should know about.
#[derive(Debug)]
pub enum ProviderEvent {
    /// A frame asked for a channel to us; `port` is our end of it.
    FrameConnected { frame: FrameRole, port: Endpoint },
    Rejected(ProviderError),
}

/// Hands out channels to frames that ask for them.
///
/// Requests are checked in order: shape and type, then sender (must be a
/// window we can reply to), then routes (pattern and origin). Repeats of an
/// answered `requestId` are ignored, since finders re-send until answered.
pub struct PortProvider {
    window: Window,
    role: FrameRole,
    routes: Vec<Route>,
    classifier: SourceClassifier,
    responder: Responder,
    reported: OnceSet,
    /// Channels created ahead of time, keyed by the frame that will ask.
    reserved: HashMap<FrameRole, (Endpoint, Endpoint)>,
    /// Where to send the counterpart end of brokered channels.
    relays: HashMap<FrameRole, PortSender>,
    /// Frames whose relay is their own link to us.
    linked: HashSet<FrameRole>,
}

impl PortProvider {
    /// A provider answering any request addressed to `role`.
    pub fn new(window: Window, role: FrameRole) -> Self {
        Self {
            window,
            role,
            routes: vec![Route::to(role, AllowedOrigin::Any)],
            classifier: SourceClassifier::default(),
            responder: Responder::new(role),
            reported: OnceSet::new(),
            reserved: HashMap::new(),
            relays: HashMap::new(),
            linked: HashSet::new(),
        }
    }

    /// The host frame's provider.
    ///
    /// Answers `guest-host` and `guest-sidebar` from anywhere, and
    /// `sidebar-host` and `notebook-sidebar` from the apps origin only. The
    /// `sidebar-host` channel is created up front; the host's end of it also
    /// carries brokered channels to the sidebar.
    pub fn host(window: Window, config: &ProviderConfig) -> Self {
        let apps = AllowedOrigin::Exact(config.apps_origin.clone());
        let mut provider = Self {
            routes: vec![
                Route::new(FrameRole::Guest, FrameRole::Host, AllowedOrigin::Any),
                Route::new(FrameRole::Guest, FrameRole::Sidebar, AllowedOrigin::Any),
                Route::new(FrameRole::Sidebar, FrameRole::Host, apps.clone()),
                Route::new(FrameRole::Notebook, FrameRole::Sidebar, apps),
            ],
            classifier: SourceClassifier::new(config.capabilities()),
            responder: Responder::broker(),
            ..Self::new(window, FrameRole::Host)
        };
        provider.reserve(FrameRole::Sidebar);
        provider
    }

    /// Answer requests matching `route` as well.
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Deliver the counterpart end of channels for `frame` through `relay`.
    pub fn add_relay(&mut self, frame: FrameRole, relay: PortSender) {
        self.relays.insert(frame, relay);
    }

    /// Create the channel to `frame` now, so it can be relayed to before
    /// `frame` asks for it.
    ///
    /// From then on the relay to `frame` follows its most recent link to us.
    pub fn reserve(&mut self, frame: FrameRole) {
        let (theirs, ours) = channel();
        self.linked.insert(frame);
        self.relays.insert(frame, ours.sender());
        self.reserved.insert(frame, (theirs, ours));
    }

    /// The role of the frame this provider runs in.
    pub fn role(&self) -> FrameRole {
        self.role
    }

    /// The window requests arrive on.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Process one inbound event to completion.
    pub fn handle_event(&mut self, event: &MessageEvent) -> Vec<ProviderEvent> {
        let Some(request) = Message::parse(&event.data) else {
            return Vec::new();
        };
        if !request.is_request() {
            return Vec::new();
        }
        let channel = request.channel();

        let source = event.source.as_ref();
        let reply_to = match self.classifier.window(source) {
            Some(window) if self.classifier.is_source_window(source) => window.clone(),
            _ => return self.reject(ProviderError::NonWindowSource { channel }),
        };

        let allowed = self.routes.iter().any(|route| route.accepts(event));
        let roles = request.roles().filter(|_| allowed);
        let Some((requester, target)) = roles else {
            return self.reject(ProviderError::DisallowedRequest {
                channel,
                origin: event.origin.clone(),
            });
        };
        if target != self.role {
            // The relay must be usable before the request counts as answered.
            match self.relays.get(&target) {
                None => {
                    return self.reject(ProviderError::NoRelay {
                        channel,
                        frame: target,
                    });
                }
                Some(relay) if relay.is_closed() => {
                    return self.reject(ProviderError::RelayClosed {
                        channel,
                        frame: target,
                    });
                }
                Some(_) => {}
            }
        }

        let Some(offer) = self.responder.respond(&request) else {
            tracing::debug!(request_id = %request.request_id, %channel, "ignoring repeated request");
            return Vec::new();
        };

        let (theirs, ours) = self.open_channel(requester, target);

        // Opaque origins show up as "null", which is not a usable target.
        let target_origin = match event.origin.as_str() {
            "null" => "*",
            origin => origin,
        };
        reply_to.post_message(&self.window, offer.to_value(), target_origin, vec![theirs]);
        tracing::debug!(request_id = %request.request_id, %channel, "sent offer");

        if target == self.role {
            return vec![ProviderEvent::FrameConnected {
                frame: requester,
                port: ours,
            }];
        }

        let forward = Message {
            kind: MessageType::Offer.as_str().to_owned(),
            ..request
        };
        let delivered = self
            .relays
            .get(&target)
            .map(|relay| relay.post_message(forward.to_value(), vec![ours]));
        match delivered {
            Some(Ok(())) => Vec::new(),
            Some(Err(_)) => self.reject(ProviderError::RelayClosed {
                channel,
                frame: target,
            }),
            None => self.reject(ProviderError::NoRelay {
                channel,
                frame: target,
            }),
        }
    }

    /// Start answering requests in a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen(mut self) -> ProviderHandle {
        let mut subscription = self.window.subscribe();
        let (events_tx, events) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                for out in self.handle_event(&event) {
                    if events_tx.send(out).is_err() {
                        return;
                    }
                }
            }
        });

        ProviderHandle { task, events }
    }

    fn open_channel(&mut self, requester: FrameRole, target: FrameRole) -> (Endpoint, Endpoint) {
        if target != self.role {
            return channel();
        }
        let (theirs, ours) = self.reserved.remove(&requester).unwrap_or_else(channel);
        // A reserved link carries brokered channels; follow it when the frame
        // reconnects.
        if self.linked.contains(&requester) {
            self.relays.insert(requester, ours.sender());
        }
        (theirs, ours)
    }

    fn reject(&mut self, err: ProviderError) -> Vec<ProviderEvent> {
        // Finders poll, so the same bad request tends to arrive many times.
        if !self.reported.insert(err.to_string()) {
            return Vec::new();
        }
        tracing::warn!(error = %err, "port request rejected");
        vec![ProviderEvent::Rejected(err)]
    }
}

/// A running provider.
///
/// Dropping the handle stops the provider, as does [`ProviderHandle::destroy`].
pub struct ProviderHandle {
    task: JoinHandle<()>,
    events: mpsc::UnboundedReceiver<ProviderEvent>,
}

impl ProviderHandle {
    /// Next event, or `None` once the provider has stopped.
    pub async fn next_event(&mut self) -> Option<ProviderEvent> {
        self.events.recv().await
    }

    /// An event if one is already queued.
    pub fn try_next_event(&mut self) -> Option<ProviderEvent> {
        self.events.try_recv().ok()
    }

    /// Stop listening for requests.
    pub fn destroy(&mut self) {
        self.task.abort();
    }
}

impl Drop for ProviderHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
