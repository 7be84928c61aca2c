//! The requesting side of port discovery.

use crate::{Endpoint, FinderConfig, Subscription, Window};
use framelink_core::{FrameRole, Seeker};
use std::time::Duration;
use uuid::Uuid;

/// Error discovering a port.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("{role} gave up waiting for a port from {counterpart} after {after:?}")]
    Timeout {
        role: FrameRole,
        counterpart: FrameRole,
        after: Duration,
    },
    #[error("offer from {counterpart} carried no port")]
    MissingPort { counterpart: FrameRole },
    #[error("window closed while waiting for {counterpart}")]
    WindowClosed { counterpart: FrameRole },
}

/// Asks other frames for a channel to a given role.
///
/// The frame that answers may not have loaded yet, so each discovery re-sends
/// its request every polling interval until an offer arrives or the wait runs
/// out.
#[derive(Debug, Clone)]
pub struct PortFinder {
    window: Window,
    role: FrameRole,
    targets: Vec<Window>,
    source_id: String,
    config: FinderConfig,
}

impl PortFinder {
    /// A finder for the frame `window` playing `role`, asking `targets`.
    pub fn new(window: Window, role: FrameRole, targets: Vec<Window>, config: FinderConfig) -> Self {
        Self {
            window,
            role,
            targets,
            source_id: Uuid::new_v4().to_string(),
            config,
        }
    }

    /// The role this finder asks on behalf of.
    pub fn role(&self) -> FrameRole {
        self.role
    }

    /// Identifies this frame in the requests it sends.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Request a channel to `counterpart` and wait for it.
    ///
    /// Dropping the returned future stops listening.
    pub async fn discover(&self, counterpart: FrameRole) -> Result<Endpoint, DiscoveryError> {
        let mut seeker = Seeker::new(self.role, counterpart).with_source_id(self.source_id.clone());
        let mut subscription = self.window.subscribe();
        let max_wait = self.config.max_wait();

        match tokio::time::timeout(max_wait, self.poll(&mut seeker, &mut subscription)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(role = %self.role, %counterpart, "port discovery timed out");
                Err(DiscoveryError::Timeout {
                    role: self.role,
                    counterpart,
                    after: max_wait,
                })
            }
        }
    }

    async fn poll(
        &self,
        seeker: &mut Seeker,
        subscription: &mut Subscription,
    ) -> Result<Endpoint, DiscoveryError> {
        let counterpart = seeker.counterpart();
        let request_id = Uuid::new_v4().to_string();
        let mut ticker = tokio::time::interval(self.config.polling_interval());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(request) = seeker.request(request_id.as_str()) {
                        tracing::trace!(%request_id, channel = %request.channel(), "sending port request");
                        let data = request.to_value();
                        for target in &self.targets {
                            target.post_message(&self.window, data.clone(), "*", Vec::new());
                        }
                    }
                }
                event = subscription.recv() => {
                    let Some(event) = event else {
                        return Err(DiscoveryError::WindowClosed { counterpart });
                    };
                    if !seeker.receive(&event.data) {
                        continue;
                    }
                    tracing::debug!(role = %self.role, %counterpart, %request_id, "received port");
                    return event
                        .take_ports()
                        .into_iter()
                        .next()
                        .ok_or(DiscoveryError::MissingPort { counterpart });
                }
            }
        }
    }
}
