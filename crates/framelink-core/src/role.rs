//! Frame roles.
//!
//! Every participant in a handshake is one of:
//! - `host` - the frame where the client is first loaded
//! - `guest` - a frame with annotatable content (may be the host itself)
//! - `notebook` - an app view in its own iframe
//! - `sidebar` - the main app, usually on a different origin than the host

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role a frame plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameRole {
    Guest,
    Host,
    Notebook,
    Sidebar,
}

impl FrameRole {
    pub const ALL: [FrameRole; 4] = [Self::Guest, Self::Host, Self::Notebook, Self::Sidebar];

    /// Wire form of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Host => "host",
            Self::Notebook => "notebook",
            Self::Sidebar => "sidebar",
        }
    }
}

impl fmt::Display for FrameRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameRole {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| RoleParseError(s.to_string()))
    }
}

/// Error parsing a frame role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown frame role: {0:?}")]
pub struct RoleParseError(pub String);
