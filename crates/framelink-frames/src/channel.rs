//! Bidirectional message channels.

use serde_json::Value;
use tokio::sync::mpsc;

/// A message posted on an [`Endpoint`], with any endpoints transferred with it.
#[derive(Debug)]
pub struct PortMessage {
    pub data: Value,
    pub ports: Vec<Endpoint>,
}

/// One end of a channel.
#[derive(Debug)]
pub struct Endpoint {
    tx: mpsc::UnboundedSender<PortMessage>,
    rx: mpsc::UnboundedReceiver<PortMessage>,
}

/// Send half of an [`Endpoint`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PortSender {
    tx: mpsc::UnboundedSender<PortMessage>,
}

/// Create a connected pair of endpoints.
pub fn channel() -> (Endpoint, Endpoint) {
    let (a_tx, a_rx) = mpsc::unbounded_channel();
    let (b_tx, b_rx) = mpsc::unbounded_channel();
    (Endpoint { tx: a_tx, rx: b_rx }, Endpoint { tx: b_tx, rx: a_rx })
}

impl Endpoint {
    /// Send to the other end.
    pub fn post_message(&self, data: Value, ports: Vec<Endpoint>) -> Result<(), TransportError> {
        send(&self.tx, data, ports)
    }

    /// Next message from the other end, or `None` once it is gone.
    pub async fn recv(&mut self) -> Option<PortMessage> {
        self.rx.recv().await
    }

    /// A message if one is already queued.
    pub fn try_recv(&mut self) -> Option<PortMessage> {
        self.rx.try_recv().ok()
    }

    /// A cloneable handle that sends to the other end.
    pub fn sender(&self) -> PortSender {
        PortSender {
            tx: self.tx.clone(),
        }
    }

    /// Whether the other end has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl PortSender {
    /// Send to the peer of the endpoint this came from.
    pub fn post_message(&self, data: Value, ports: Vec<Endpoint>) -> Result<(), TransportError> {
        send(&self.tx, data, ports)
    }

    /// Whether the receiving end has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

fn send(
    tx: &mpsc::UnboundedSender<PortMessage>,
    data: Value,
    ports: Vec<Endpoint>,
) -> Result<(), TransportError> {
    tx.send(PortMessage { data, ports })
        .map_err(|_| TransportError::Disconnected)
}

/// Error sending on a channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("the other end of the channel is closed")]
    Disconnected,
}
