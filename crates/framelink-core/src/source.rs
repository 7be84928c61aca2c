//! Classification of message senders.
//!
//! Replies can only be posted back to window-like senders. Ports and service
//! workers reply through other means, so callers branch on this before
//! answering.

/// The sender attached to an inbound message event.
///
/// `W` is the transport's window handle type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource<W> {
    Window(W),
    MessagePort,
    ServiceWorker,
}

/// What the current environment supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether service workers exist here at all.
    pub service_workers: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            service_workers: true,
        }
    }
}

/// Decides whether a sender can be replied to as a window.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceClassifier {
    capabilities: Capabilities,
}

impl SourceClassifier {
    /// A classifier for an environment with `capabilities`.
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    /// The capabilities it was built with.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// False for a missing source, a port, or a service worker (when the
    /// environment has them). True for anything else.
    ///
    /// Without service-worker support nothing can be recognised as one, so
    /// that variant falls through to `true` like any other source.
    pub fn is_source_window<W>(&self, source: Option<&MessageSource<W>>) -> bool {
        match source {
            None | Some(MessageSource::MessagePort) => false,
            Some(MessageSource::ServiceWorker) => !self.capabilities.service_workers,
            Some(MessageSource::Window(_)) => true,
        }
    }

    /// The window to reply to, if the source is one.
    pub fn window<'a, W>(&self, source: Option<&'a MessageSource<W>>) -> Option<&'a W> {
        match source? {
            MessageSource::Window(window) => Some(window),
            _ => None,
        }
    }
}

/// [`SourceClassifier::is_source_window`] with default capabilities.
pub fn is_source_window<W>(source: Option<&MessageSource<W>>) -> bool {
    SourceClassifier::default().is_source_window(source)
}
