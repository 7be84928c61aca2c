//! Demo configuration, read from TOML.

use anyhow::Context;
use framelink_frames::{FinderConfig, ProviderConfig};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin of the host page.
    pub host_origin: String,
    /// Origin guest frames are loaded from.
    pub guest_origin: String,
    pub provider: ProviderConfig,
    pub finder: FinderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host_origin: "https://example.com".into(),
            guest_origin: "https://example.com".into(),
            provider: ProviderConfig::default(),
            finder: FinderConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path`, or use defaults when there is none.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text)
    }

    /// Parse TOML text; missing keys take their defaults.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
