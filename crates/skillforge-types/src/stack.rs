//! Stack definitions and the source-level configuration files that feed the
//! resolver: `config/stacks.yaml`, `config/skill-aliases.yaml` and
//! `config/agent-mappings.yaml`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named bundle mapping agent roles to technology choices.
///
/// ```yaml
/// id: nextjs-fullstack
/// name: Next.js Fullstack
/// description: React + Next.js with a Postgres API
/// agents:
///   web-developer:
///     framework: react
///     styling: tailwind
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// agent id -> (subcategory -> technology alias)
    #[serde(default)]
    pub agents: BTreeMap<String, BTreeMap<String, String>>,
}

impl Stack {
    pub fn agent_ids(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }
}

/// `config/stacks.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StacksFile {
    #[serde(default)]
    pub stacks: Vec<Stack>,
}

/// `config/skill-aliases.yaml`: short technology alias -> canonical skill id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillAliasesFile {
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// `config/agent-mappings.yaml`: category prefix -> consuming agents.
///
/// Entries replace the built-in mapping for the same prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentMappingsFile {
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}
