//! Skill domain types.
//!
//! Defines the on-disk shapes of a skill (`SKILL.md` frontmatter and the
//! sibling `metadata.yaml`), the merged [`SkillDefinition`] held by the
//! matrix, and the resolved forms consumed by the compiler.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// On-disk documents
// ---------------------------------------------------------------------------

/// Parsed `SKILL.md` YAML frontmatter.
///
/// `name` is the skill's canonical id; `description` is shown to the agent
/// when deciding whether to activate the skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillFrontmatter {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(
        default,
        rename = "allowed-tools",
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed_tools: Option<String>,
}

/// The `metadata.yaml` document stored beside every `SKILL.md`.
///
/// Source skills must declare a `category`. Local skills reuse the same
/// document to carry fork provenance under `forked-from`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SkillMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommends: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_guidance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forked_from: Option<ForkedFrom>,
}

/// Provenance of a forked skill: which source skill it was copied from and
/// that skill's content hash at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ForkedFrom {
    pub skill_id: String,
    pub content_hash: String,
    pub date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Matrix entries
// ---------------------------------------------------------------------------

/// A skill as held by the matrix after source and local overrides merge.
#[derive(Debug, Clone, Serialize)]
pub struct SkillDefinition {
    /// Canonical id (the frontmatter `name`).
    pub id: String,
    /// Absolute path of the skill directory.
    pub path: PathBuf,
    /// `/`-joined path relative to the root the skill was discovered under.
    pub relative_path: String,
    /// Human-readable display name.
    pub name: String,
    pub description: String,
    /// `domain/subcategory`, e.g. `web/framework`.
    pub category: String,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub requires: BTreeSet<String>,
    pub conflicts: BTreeSet<String>,
    pub recommends: BTreeSet<String>,
    pub usage_guidance: Option<String>,
    pub local: bool,
    pub local_path: Option<PathBuf>,
    pub forked_from: Option<ForkedFrom>,
    pub content_hash: String,
}

impl SkillDefinition {
    /// Last segment of the category (`framework` for `web/framework`).
    pub fn subcategory(&self) -> &str {
        self.category.rsplit('/').next().unwrap_or(&self.category)
    }

    /// First segment of the category (`web` for `web/framework`).
    pub fn domain(&self) -> &str {
        self.category.split('/').next().unwrap_or(&self.category)
    }

    /// Guidance telling an agent when to load this skill.
    pub fn usage_text(&self) -> String {
        match self.usage_guidance.as_deref() {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => format!("when working with {}", self.name),
        }
    }
}

/// Whether an id carries an author qualifier such as `react (@acme)`.
pub fn is_author_qualified(id: &str) -> bool {
    id.contains("(@")
}

// ---------------------------------------------------------------------------
// Resolution outputs
// ---------------------------------------------------------------------------

/// A canonical skill reference produced by stack alias resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillReference {
    pub id: String,
    pub preloaded: bool,
    /// The stack subcategory the reference came from.
    pub subcategory: String,
}

/// A skill resolved against the matrix, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSkill {
    pub id: String,
    pub path: PathBuf,
    pub name: String,
    pub description: String,
    /// "when working with X" style guidance.
    pub usage: String,
    pub preloaded: bool,
}

impl ResolvedSkill {
    /// Build the compiled form of a matrix skill.
    pub fn from_definition(skill: &SkillDefinition, preloaded: bool) -> Self {
        Self {
            id: skill.id.clone(),
            path: skill.path.clone(),
            name: skill.name.clone(),
            description: skill.description.clone(),
            usage: skill.usage_text(),
            preloaded,
        }
    }
}
