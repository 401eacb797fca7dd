//! The persisted project configuration (`.claude/config.yaml`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assignment::SkillAssignment;

/// Per-agent skill buckets: agent id -> subcategory -> assignments.
pub type AgentSkillMap = BTreeMap<String, BTreeMap<String, Vec<SkillAssignment>>>;

/// How compiled output is installed into the project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallMode {
    /// Agents and skills are written into the project's `.claude/` directory.
    #[default]
    Local,
    /// Skills are consumed as marketplace plugins.
    Plugin,
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Plugin => write!(f, "plugin"),
        }
    }
}

/// Agent-centric project configuration.
///
/// Optional sections are skipped when empty so the persisted file stays
/// minimal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub install_mode: InstallMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<SkillAssignment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub agent_skills: AgentSkillMap,
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            install_mode: InstallMode::default(),
            stack: None,
            skills: Vec::new(),
            agents: Vec::new(),
            domains: Vec::new(),
            agent_skills: BTreeMap::new(),
        }
    }

    /// Ids of the flat skill list, in order.
    pub fn skill_ids(&self) -> Vec<&str> {
        self.skills.iter().map(SkillAssignment::id).collect()
    }

    /// Find the flat-list entry for a skill id.
    pub fn skill_entry(&self, id: &str) -> Option<&SkillAssignment> {
        self.skills.iter().find(|a| a.id() == id)
    }
}
