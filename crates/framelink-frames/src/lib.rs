//! Frames talking to frames.
//!
//! An in-process stand-in for the browser's cross-frame messaging:
//! [`Window`]s that broadcast message events to their listeners, and
//! [`channel`]s whose [`Endpoint`]s can be transferred alongside a message.
//! On top of that sit the two halves of port discovery:
//!
//! ```text
//!   PortFinder (guest, sidebar, notebook)     PortProvider (host)
//!   1. post request to target windows  ---->  2. check route, create channel
//!   4. take the offered port           <----  3. reply with one end
//!                                             5. hand the other end to the
//!                                                counterpart (event or relay)
//! ```
//!
//! Finders may start before the provider exists, so they re-send their
//! request every polling interval until answered or the wait runs out.

mod channel;
mod config;
mod finder;
mod provider;
mod window;

pub use channel::{Endpoint, PortMessage, PortSender, TransportError, channel};
pub use config::{FinderConfig, ProviderConfig};
pub use finder::{DiscoveryError, PortFinder};
pub use provider::{AllowedOrigin, PortProvider, ProviderError, ProviderEvent, ProviderHandle, Route};
pub use window::{EventSource, MessageEvent, Subscription, Window};

pub use framelink_core::{FrameRole, Message, MessagePattern, MessageType};
