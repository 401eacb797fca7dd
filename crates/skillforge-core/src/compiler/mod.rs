//! Agent compilation: resolve each agent's skills from the project config or
//! its stack, then render the agent document.

pub mod render;

use std::collections::BTreeSet;

use skillforge_types::agent::CompiledAgent;
use skillforge_types::error::{PipelineError, PipelineWarning};
use skillforge_types::project::ProjectConfig;
use skillforge_types::skill::ResolvedSkill;

use crate::matrix::resolver::{
    resolve_agent, resolve_skill_reference, resolve_stack, resolve_stack_agent_skills,
};
use crate::matrix::SkillMatrix;

/// Skills for one agent plus anything skipped while resolving them.
#[derive(Debug, Clone, Default)]
pub struct AgentSkills {
    pub skills: Vec<ResolvedSkill>,
    pub warnings: Vec<PipelineWarning>,
}

/// Resolve an agent's skills.
///
/// Uses the agent's `agentSkills` buckets when the config has them, else the
/// config's stack. An agent with neither gets no skills.
pub fn resolve_agent_skills(
    agent_id: &str,
    config: &ProjectConfig,
    matrix: &SkillMatrix,
) -> Result<AgentSkills, PipelineError> {
    if let Some(categories) = config.agent_skills.get(agent_id) {
        let mut seen = BTreeSet::new();
        let mut skills = Vec::new();
        for assignment in categories.values().flatten() {
            if !seen.insert(assignment.id()) {
                continue;
            }
            let skill = resolve_skill_reference(assignment.id(), matrix)?;
            skills.push(ResolvedSkill::from_definition(skill, assignment.is_preloaded()));
        }
        return Ok(AgentSkills {
            skills,
            warnings: Vec::new(),
        });
    }

    if let Some(stack_id) = &config.stack {
        let stack = resolve_stack(stack_id, matrix)?;
        let (skills, warnings) = resolve_stack_agent_skills(agent_id, stack, matrix)?;
        return Ok(AgentSkills { skills, warnings });
    }

    Ok(AgentSkills::default())
}

/// Build the compiled form of an agent from its definition and skills.
pub fn compile_agent(
    agent_id: &str,
    skills: Vec<ResolvedSkill>,
    matrix: &SkillMatrix,
) -> Result<(CompiledAgent, String), PipelineError> {
    let definition = resolve_agent(agent_id, matrix)?;
    let compiled = CompiledAgent::from_definition(definition, skills);
    let document = render::render_agent(&compiled, &definition.partials)?;
    Ok((compiled, document))
}

/// Resolve and render one agent of a project config.
pub fn compile_config_agent(
    agent_id: &str,
    config: &ProjectConfig,
    matrix: &SkillMatrix,
) -> Result<(String, Vec<PipelineWarning>), PipelineError> {
    let resolved = resolve_agent_skills(agent_id, config, matrix)?;
    let (_, document) = compile_agent(agent_id, resolved.skills, matrix)?;
    Ok((document, resolved.warnings))
}
