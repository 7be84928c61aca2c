//! Windows and message events.
//!
//! A [`Window`] stands in for a browsing context. Every message posted to it is
//! delivered to all current listeners, whoever sent it, just like the `message`
//! event on a real window. Listeners must cope with traffic that is not meant
//! for them.

use crate::Endpoint;
use framelink_core::MessageSource;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Sender of a [`MessageEvent`].
pub type EventSource = MessageSource<Window>;

/// A message delivered to a window.
pub struct MessageEvent {
    pub data: Value,
    /// Origin of the sender. `"null"` for opaque origins.
    pub origin: String,
    pub source: Option<EventSource>,
    ports: Mutex<Vec<Endpoint>>,
}

impl MessageEvent {
    /// An event from `source`, carrying `ports`.
    pub fn new(
        data: Value,
        origin: impl Into<String>,
        source: Option<EventSource>,
        ports: Vec<Endpoint>,
    ) -> Self {
        Self {
            data,
            origin: origin.into(),
            source,
            ports: Mutex::new(ports),
        }
    }

    /// Claim the transferred endpoints. Later callers get nothing.
    pub fn take_ports(&self) -> Vec<Endpoint> {
        let mut ports = self.ports.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *ports)
    }
}

impl fmt::Debug for MessageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageEvent")
            .field("data", &self.data)
            .field("origin", &self.origin)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Handle to a frame's window. Clones refer to the same window.
#[derive(Clone)]
pub struct Window {
    inner: Arc<WindowInner>,
}

struct WindowInner {
    origin: String,
    listeners: Mutex<Vec<mpsc::UnboundedSender<Arc<MessageEvent>>>>,
}

impl WindowInner {
    fn listeners(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<Arc<MessageEvent>>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Window {
    /// A window with no listeners.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(WindowInner {
                origin: origin.into(),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// This window's origin.
    pub fn origin(&self) -> &str {
        &self.inner.origin
    }

    /// Start listening for messages. Dropping the subscription stops it.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.listeners().push(tx);
        Subscription { rx }
    }

    /// Post `data` to this window on behalf of `from`.
    ///
    /// Dropped without error unless `target_origin` is `*` or this window's
    /// origin.
    pub fn post_message(&self, from: &Window, data: Value, target_origin: &str, ports: Vec<Endpoint>) {
        if target_origin != "*" && target_origin != self.origin() {
            tracing::debug!(
                target_origin,
                origin = self.origin(),
                "dropping message for mismatched origin"
            );
            return;
        }
        self.dispatch(MessageEvent::new(
            data,
            from.origin(),
            Some(EventSource::Window(from.clone())),
            ports,
        ));
    }

    /// Deliver an event as is, in order, to every current listener.
    pub fn dispatch(&self, event: MessageEvent) {
        let event = Arc::new(event);
        let mut listeners = self.inner.listeners();
        listeners.retain(|tx| tx.send(Arc::clone(&event)).is_ok());
        if listeners.is_empty() {
            tracing::trace!(origin = self.origin(), "no listeners for message");
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        let mut listeners = self.inner.listeners();
        listeners.retain(|tx| !tx.is_closed());
        listeners.len()
    }

    /// Whether two handles refer to the same window.
    pub fn same_window(&self, other: &Window) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window").field("origin", &self.inner.origin).finish()
    }
}

/// A message listener on a window.
///
/// Each listener has its own unbounded queue, so events are never dropped and
/// arrive in the order they were dispatched.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Arc<MessageEvent>>,
}

impl Subscription {
    /// Next event, or `None` once the window is gone.
    pub async fn recv(&mut self) -> Option<Arc<MessageEvent>> {
        self.rx.recv().await
    }

    /// An event if one is already queued.
    pub fn try_recv(&mut self) -> Option<Arc<MessageEvent>> {
        self.rx.try_recv().ok()
    }
}
