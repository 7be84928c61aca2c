//! Provider and finder settings.

use framelink_core::Capabilities;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the host [`PortProvider`](crate::PortProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Origin the sidebar and notebook apps are served from. Requests for
    /// `sidebar-host` and `notebook-sidebar` must come from here.
    pub apps_origin: String,
    /// Whether the environment has service workers.
    pub service_workers: bool,
}

impl ProviderConfig {
    /// Defaults, with the given apps origin.
    pub fn new(apps_origin: impl Into<String>) -> Self {
        Self {
            apps_origin: apps_origin.into(),
            ..Self::default()
        }
    }

    /// What the provider's environment supports.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            service_workers: self.service_workers,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            apps_origin: "https://hypothes.is".into(),
            service_workers: true,
        }
    }
}

/// Settings for a [`PortFinder`](crate::PortFinder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// How often an unanswered request is re-sent.
    pub polling_interval_ms: u64,
    /// How long to wait for an offer before giving up.
    pub max_wait_ms: u64,
}

impl FinderConfig {
    /// Time between re-sent requests, at least one millisecond.
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms.max(1))
    }

    /// How long to wait for an offer.
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: 250,
            max_wait_ms: 20_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let finder: FinderConfig = serde_json::from_str(r#"{ "max_wait_ms": 500 }"#).unwrap();
        assert_eq!(finder.max_wait(), Duration::from_millis(500));
        assert_eq!(finder.polling_interval(), Duration::from_millis(250));

        let provider: ProviderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(provider, ProviderConfig::default());
        assert!(provider.capabilities().service_workers);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let finder = FinderConfig {
            polling_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(finder.polling_interval(), Duration::from_millis(1));
    }
}
