//! TOML configuration for the `cohash` CLI.
//!
//! Every section is optional. Command-line flags override whatever the file
//! sets.

use std::path::Path;

use anyhow::Context;
use cohash_ring::{DEFAULT_VNODE_COUNT, HashAlgorithm};
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring shape and initial members.
    pub ring: RingSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ring]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Vnodes per member. Defaults to 200.
    pub vnode_count: Option<usize>,
    /// Hash primitive: `"blake3"` (default) or `"xxh3"`.
    pub hash: HashAlgorithm,
    /// Member addresses added to the ring at startup.
    pub nodes: Vec<String>,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read {}", p.display()))?;
                let config: CliConfig = toml::from_str(&content)
                    .with_context(|| format!("failed to parse {}", p.display()))?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Effective vnodes per member.
    pub fn vnode_count(&self) -> usize {
        self.ring.vnode_count.unwrap_or(DEFAULT_VNODE_COUNT)
    }

    /// Apply command-line overrides. Empty `nodes` keeps the configured list.
    pub fn apply_overrides(
        &mut self,
        vnodes: Option<usize>,
        hash: Option<HashAlgorithm>,
        nodes: Vec<String>,
    ) {
        if let Some(v) = vnodes {
            self.ring.vnode_count = Some(v);
        }
        if let Some(h) = hash {
            self.ring.hash = h;
        }
        if !nodes.is_empty() {
            self.ring.nodes = nodes;
        }
    }
}
