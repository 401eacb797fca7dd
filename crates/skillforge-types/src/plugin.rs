//! Plugin manifests, the internal content-hash marker, and the marketplace
//! index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public manifest written to `.claude-plugin/plugin.json`.
///
/// Content hashes and timestamps never appear here; they live in the
/// sibling [`ContentHashMarker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: PluginAuthor,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Skill plugin names bundled by a stack plugin.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl PluginAuthor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }
}

/// Internal marker stored in `.claude-plugin/.skillforge-meta.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentHashMarker {
    pub content_hash: String,
    pub updated_at: DateTime<Utc>,
}

/// The outcome of a version decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: semver::Version,
    pub content_hash: String,
    /// Whether the content hash differs from the stored one.
    pub changed: bool,
}

/// `.claude-plugin/marketplace.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceIndex {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<PluginAuthor>,
    #[serde(default)]
    pub plugins: Vec<MarketplacePlugin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplacePlugin {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Plugin directory relative to the marketplace root, `./`-prefixed.
    pub source: String,
}
