//! Agent role definitions: the source-side `agent.yaml` plus its partial text
//! blocks, and the compiled form rendered into an agent document.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::skill::ResolvedSkill;

/// Parsed `agents/<id>/agent.yaml` together with its partials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Defaults to the agent's directory name when omitted.
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(skip)]
    pub partials: AgentPartials,
    #[serde(skip)]
    pub path: PathBuf,
}

fn default_model() -> String {
    "opus".to_string()
}

/// Markdown blocks stitched into the compiled agent body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentPartials {
    /// `intro.md` (required).
    pub intro: String,
    /// `workflow.md` (required).
    pub workflow: String,
    /// `examples.md`
    pub examples: Option<String>,
    /// `critical-requirements.md`
    pub critical_requirements: Option<String>,
    /// `output-format.md`
    pub output_format: Option<String>,
}

/// An agent with its resolved skills, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledAgent {
    pub name: String,
    pub title: String,
    pub description: String,
    pub tools: Vec<String>,
    pub model: String,
    pub skills: Vec<ResolvedSkill>,
}

impl CompiledAgent {
    pub fn from_definition(definition: &AgentDefinition, skills: Vec<ResolvedSkill>) -> Self {
        Self {
            name: definition.id.clone(),
            title: definition.title.clone(),
            description: definition.description.clone(),
            tools: definition.tools.clone(),
            model: definition.model.clone(),
            skills,
        }
    }

    /// Skills embedded in the frontmatter.
    pub fn preloaded(&self) -> impl Iterator<Item = &ResolvedSkill> {
        self.skills.iter().filter(|s| s.preloaded)
    }

    /// Skills the agent activates on demand.
    pub fn dynamic(&self) -> impl Iterator<Item = &ResolvedSkill> {
        self.skills.iter().filter(|s| !s.preloaded)
    }
}
